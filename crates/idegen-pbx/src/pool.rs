use std::collections::{hash_map::Entry, HashMap};

use tracing::debug;

use crate::{
    writer::Writer, Digest, Error, HashSource, HashableChain, Isa, Node, ObjectId, Reference,
    Result, Value,
};

/// Version of the archive format written in the container block.
pub const ARCHIVE_VERSION: i64 = 1;

/// Object format version written in the container block (Xcode 3.2).
pub const OBJECT_VERSION: i64 = 46;

/// Every object of a project, keyed by id.
#[derive(Debug, Default)]
pub struct ObjectPool {
    objects: HashMap<ObjectId, Node>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze `node` and add it to the pool.
    ///
    /// Ids have no fallback space: if another object already folded to the
    /// same id, this fails with [`Error::IdCollision`] and the project must
    /// not be written.
    pub fn insert(&mut self, mut node: Node) -> Result<Reference> {
        node.freeze();
        let id = node.id();
        match self.objects.entry(id) {
            Entry::Occupied(existing) => Err(Error::IdCollision {
                id,
                existing: existing.get().isa(),
                inserted: node.isa(),
            }),
            Entry::Vacant(slot) => {
                debug!(%id, isa = %node.isa(), name = ?node.name(), "adding object");
                slot.insert(node);
                Ok(Reference::new(id))
            }
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&Node> {
        self.objects.get(&id)
    }

    pub fn resolve(&self, reference: Reference) -> Result<&Node> {
        self.get(reference.id())
            .ok_or(Error::DanglingReference(reference.id()))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.objects.values()
    }
}

/// The pool hashes as an object whose parent is the document container:
/// `[PBXObjects, digest([PBXContainer])]`.
impl HashSource for ObjectPool {
    fn digest(&self) -> Digest {
        let mut container = HashableChain::new();
        container.push(Isa::Container.as_str());

        let mut chain = HashableChain::new();
        chain.push(Isa::Objects.as_str());
        chain.push(container.digest());
        chain.digest()
    }
}

/// The root of a project file: format versions, the object pool and a
/// reference to the project object.
#[derive(Debug)]
pub struct Document {
    container: Node,
    objects: ObjectPool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut container = Node::new(Isa::Container, None, None);
        let properties = [
            ("archiveVersion", Value::Int(ARCHIVE_VERSION)),
            ("classes", Value::map()),
            ("objectVersion", Value::Int(OBJECT_VERSION)),
        ];
        for (key, value) in properties {
            container.properties_mut().insert(key.to_string(), value);
        }
        Self {
            container,
            objects: ObjectPool::new(),
        }
    }

    pub fn objects(&self) -> &ObjectPool {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectPool {
        &mut self.objects
    }

    /// Sets `rootObject`. May be called once per document.
    pub fn set_root_object(&mut self, root: Reference) -> Result<()> {
        if let Ok(existing) = self.root_object() {
            return Err(Error::RootObjectAlreadySet(existing.id()));
        }
        self.container.set_property("rootObject", root)
    }

    pub fn root_object(&self) -> Result<Reference> {
        let root = self.container.property("rootObject")?;
        root.as_reference().ok_or_else(|| Error::MissingProperty {
            isa: Isa::Container,
            key: "rootObject".to_string(),
        })
    }

    /// Render the whole project file.
    pub fn render(&self) -> Result<String> {
        self.root_object()?;
        let mut writer = Writer::new(&self.objects);
        writer.write_document(&self.container)?;
        Ok(writer.finish())
    }
}
