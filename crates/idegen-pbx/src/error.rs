use thiserror::Error;

use crate::{Isa, ObjectId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("object id collision: `{id}` is already taken by a {existing} (inserting a {inserted})")]
    IdCollision {
        id: ObjectId,
        existing: Isa,
        inserted: Isa,
    },

    #[error("{isa} has no property `{key}`")]
    MissingProperty { isa: Isa, key: String },

    #[error("cannot modify property `{key}` of {isa}: object is frozen")]
    Frozen { isa: Isa, key: String },

    #[error("document already has a root object: `{0}`")]
    RootObjectAlreadySet(ObjectId),

    #[error("reference to `{0}` does not resolve to any object in the pool")]
    DanglingReference(ObjectId),
}

pub type Result<T> = std::result::Result<T, Error>;
