use std::{cell::OnceCell, collections::BTreeMap, fmt};

use crate::{
    Digest, Error, HashSource, HashableChain, ObjectId, Reference, Result, Value,
};

/// The class of an object, written as its `isa` and used as its section name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Isa {
    BuildFile,
    Container,
    FileReference,
    Group,
    LegacyTarget,
    NativeTarget,
    Objects,
    Project,
    SourcesBuildPhase,
    BuildConfiguration,
    ConfigurationList,
}

impl Isa {
    pub fn as_str(self) -> &'static str {
        match self {
            Isa::BuildFile => "PBXBuildFile",
            Isa::Container => "PBXContainer",
            Isa::FileReference => "PBXFileReference",
            Isa::Group => "PBXGroup",
            Isa::LegacyTarget => "PBXLegacyTarget",
            Isa::NativeTarget => "PBXNativeTarget",
            Isa::Objects => "PBXObjects",
            Isa::Project => "PBXProject",
            Isa::SourcesBuildPhase => "PBXSourcesBuildPhase",
            Isa::BuildConfiguration => "XCBuildConfiguration",
            Isa::ConfigurationList => "XCConfigurationList",
        }
    }

    /// File references and build files are written on a single line,
    /// everything else as an indented block.
    pub fn layout(self) -> Layout {
        match self {
            Isa::BuildFile | Isa::FileReference => Layout::SingleLine,
            _ => Layout::MultiLine,
        }
    }

    /// Whether blocks of this class start with an `isa = ...;` entry.
    pub fn writes_isa(self) -> bool {
        !matches!(self, Isa::Container | Isa::Objects)
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    SingleLine,
    MultiLine,
}

impl Layout {
    pub fn is_single_line(self) -> bool {
        self == Layout::SingleLine
    }
}

/// An object of the project graph: a class tag plus a bag of properties.
///
/// Identity inputs (class, name, hash parent and extra hashables) are fixed
/// when the node is constructed, so its id may be read at any time. The
/// properties stay editable until the node is frozen, which happens at the
/// latest when it is inserted into an [`ObjectPool`](crate::ObjectPool).
#[derive(Clone, Debug)]
pub struct Node {
    isa: Isa,
    name: Option<String>,
    comment: Option<String>,
    hash_parent: Option<Digest>,
    extra_hashables: HashableChain,
    properties: BTreeMap<String, Value>,
    frozen: bool,

    chain: OnceCell<HashableChain>,
    digest: OnceCell<Digest>,
    id: OnceCell<ObjectId>,
}

impl Node {
    pub fn new(isa: Isa, name: Option<String>, hash_parent: Option<&dyn HashSource>) -> Self {
        Self::with_extra_hashables(isa, name, hash_parent, HashableChain::new())
    }

    /// Like [`Node::new`], with extra terms appended to the hashable chain.
    pub fn with_extra_hashables(
        isa: Isa,
        name: Option<String>,
        hash_parent: Option<&dyn HashSource>,
        extra_hashables: HashableChain,
    ) -> Self {
        Self {
            isa,
            name,
            comment: None,
            hash_parent: hash_parent.map(|parent| parent.digest()),
            extra_hashables,
            properties: BTreeMap::new(),
            frozen: false,
            chain: OnceCell::new(),
            digest: OnceCell::new(),
            id: OnceCell::new(),
        }
    }

    /// Replace the comment written next to references to this node.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn isa(&self) -> Isa {
        self.isa
    }

    pub fn layout(&self) -> Layout {
        self.isa.layout()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The comment written next to this node's id; defaults to its name.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref().or(self.name())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        self.check_not_frozen(&key)?;
        self.properties.insert(key, value.into());
        Ok(())
    }

    pub fn remove_property(&mut self, key: &str) -> Result<Option<Value>> {
        self.check_not_frozen(key)?;
        Ok(self.properties.remove(key))
    }

    pub fn property(&self, key: &str) -> Result<&Value> {
        self.properties.get(key).ok_or_else(|| self.missing(key))
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Properties in key order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn properties_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.properties
    }

    /// Append `value` to the list stored under `key`.
    pub fn push_to_list(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.check_not_frozen(key)?;
        if let Some(Value::List(values)) = self.properties.get_mut(key) {
            values.push(value.into());
            return Ok(());
        }
        Err(self.missing(key))
    }

    /// Insert `entry = value` into the map stored under `key`.
    pub fn insert_into_map(
        &mut self,
        key: &str,
        entry: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.check_not_frozen(key)?;
        if let Some(Value::Map(map)) = self.properties.get_mut(key) {
            map.insert(entry.into(), value.into());
            return Ok(());
        }
        Err(self.missing(key))
    }

    pub fn reference(&self) -> Reference {
        Reference::new(self.id())
    }

    /// `[isa, name?, parent digest?, extra...]`, computed once.
    pub fn hashable_chain(&self) -> &HashableChain {
        self.chain.get_or_init(|| {
            let mut chain = HashableChain::new();
            chain.push(self.isa.as_str());
            if let Some(name) = &self.name {
                chain.push(name);
            }
            if let Some(parent) = &self.hash_parent {
                chain.push(parent);
            }
            chain.extend_from(&self.extra_hashables);
            chain
        })
    }

    pub fn id(&self) -> ObjectId {
        *self.id.get_or_init(|| ObjectId::from_digest(&self.digest()))
    }

    fn check_not_frozen(&self, key: &str) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen {
                isa: self.isa,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    fn missing(&self, key: &str) -> Error {
        Error::MissingProperty {
            isa: self.isa,
            key: key.to_string(),
        }
    }
}

impl HashSource for Node {
    fn digest(&self) -> Digest {
        *self.digest.get_or_init(|| self.hashable_chain().digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_node_rejects_mutation() {
        let mut node = Node::new(Isa::Group, Some("src".into()), None);
        node.set_property("children", Value::list()).unwrap();
        node.freeze();

        assert!(matches!(
            node.set_property("path", "src"),
            Err(Error::Frozen { .. })
        ));
        assert!(matches!(
            node.push_to_list("children", "x"),
            Err(Error::Frozen { .. })
        ));
        assert!(matches!(node.remove_property("children"), Err(Error::Frozen { .. })));
    }

    #[test]
    fn missing_property() {
        let node = Node::new(Isa::Group, None, None);
        assert!(matches!(
            node.property("children"),
            Err(Error::MissingProperty { .. })
        ));
    }

    #[test]
    fn comment_defaults_to_name() {
        let node = Node::new(Isa::Project, Some("Sources".into()), None);
        assert_eq!(node.comment(), Some("Sources"));

        let node = node.with_comment("Project object");
        assert_eq!(node.comment(), Some("Project object"));
        assert_eq!(node.name(), Some("Sources"));
    }

    #[test]
    fn chain_layout() {
        let parent = Node::new(Isa::Group, None, None);
        let mut extra = HashableChain::new();
        extra.push("lib/src");
        let child =
            Node::with_extra_hashables(Isa::Group, Some("src".into()), Some(&parent), extra);

        let elements: Vec<&[u8]> = child.hashable_chain().iter().collect();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0], b"PBXGroup");
        assert_eq!(elements[1], b"src");
        let parent_digest = parent.digest();
        assert_eq!(elements[2], &parent_digest.as_bytes()[..]);
        assert_eq!(elements[3], b"lib/src");
    }

    #[test]
    fn properties_do_not_change_identity() {
        let mut node = Node::new(Isa::Group, Some("src".into()), None);
        let before = node.id();
        node.set_property("children", Value::list()).unwrap();
        assert_eq!(node.id(), before);
    }
}
