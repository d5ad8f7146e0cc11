//! Object model and writer for Xcode `project.pbxproj` files.
//!
//! A project file is a flat pool of objects keyed by 96-bit ids, with
//! objects pointing at each other by id. Build the objects with the
//! constructors in [`objects`], insert them into the [`ObjectPool`] of a
//! [`Document`], then [`Document::render`] it.

mod error;
pub use error::{Error, Result};

mod identity;
pub use identity::{Digest, HashSource, HashableChain, ObjectId};

mod value;
pub use value::{Reference, Value};

mod node;
pub use node::{Isa, Layout, Node};

/// Quoting and escaping of text values.
pub mod encode;

/// Constructors for each object class.
pub mod objects;

mod pool;
pub use pool::{Document, ObjectPool, ARCHIVE_VERSION, OBJECT_VERSION};

mod writer;
pub use writer::FORMAT_MARKER;
