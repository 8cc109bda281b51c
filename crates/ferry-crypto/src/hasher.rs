use ferry_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is hashed ahead of the data, so a blob and a tree with
/// identical bytes never share an id.
#[derive(Debug, Clone, Copy)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    pub const BLOB: Self = Self::new("ferry-blob-v1");
    pub const TREE: Self = Self::new("ferry-tree-v1");
    /// Request envelopes signed by a session key.
    pub const REQUEST: Self = Self::new("ferry-request-v1");

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    pub fn hash(&self, data: &[u8]) -> ObjectId {
        self.hash_parts(&[data])
    }

    /// Hash several fields as one object. Each part is length-prefixed so
    /// `["ab", "c"]` and `["a", "bc"]` hash differently.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
