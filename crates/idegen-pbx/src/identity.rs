//! Content-derived object identity.
//!
//! Every object in a project file is keyed by a 96-bit identifier. We never
//! allocate those from a counter: the identifier is a fold of the SHA-1
//! digest of the object's *hashable chain*, so regenerating an unchanged
//! build graph reproduces the exact same file.

use std::fmt;

use sha1::{Digest as _, Sha1};

/// The 160-bit digest of a [`HashableChain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digest([u8; 20]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Ordered list of byte strings that determines an object's digest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashableChain {
    elements: Vec<Vec<u8>>,
}

impl HashableChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: impl AsRef<[u8]>) {
        self.elements.push(element.as_ref().to_vec());
    }

    /// Appends every element of `other`, not just its digest.
    pub fn extend_from(&mut self, other: &HashableChain) {
        self.elements.extend(other.elements.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.elements.iter().map(|e| e.as_slice())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// SHA-1 over all elements, each prefixed with its length as a 4-byte
    /// big-endian integer so that differently segmented chains never collide.
    pub fn digest(&self) -> Digest {
        let mut sha = Sha1::new();
        for element in &self.elements {
            sha.update((element.len() as u32).to_be_bytes());
            sha.update(element);
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&sha.finalize());
        Digest(bytes)
    }
}

/// Identifier of an object inside the pool, rendered as 24 upper-case hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u32; 3]);

impl ObjectId {
    /// Folds the 160-bit digest down to 96 bits: the five big-endian words
    /// are XOR-ed into three accumulators, word `i` going to `i % 3`.
    pub fn from_digest(digest: &Digest) -> Self {
        let mut words = [0u32; 3];
        for (index, chunk) in digest.0.chunks_exact(4).enumerate() {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            words[index % 3] ^= word;
        }
        ObjectId(words)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a:08X}{b:08X}{c:08X}")
    }
}

/// Anything whose digest can scope the identity of another object.
///
/// Objects are hashed under a parent by folding in the parent's digest rather
/// than its whole chain, which keeps deep trees linear to hash.
pub trait HashSource {
    fn digest(&self) -> Digest;
}
