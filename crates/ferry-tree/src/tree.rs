use std::collections::BTreeMap;

use ferry_crypto::ContentHasher;
use ferry_types::{normalize_relative, FileBlob, ObjectId};

use crate::error::{TreeError, TreeResult};

/// Content-addressed id of a single blob: path, content type, and content.
pub fn blob_id(blob: &FileBlob) -> ObjectId {
    ContentHasher::BLOB.hash_parts(&[
        blob.path.as_bytes(),
        blob.content_type.as_bytes(),
        blob.content.as_bytes(),
    ])
}

/// An ordered mapping from working-copy path to blob.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, FileBlob>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob under its own path.
    pub fn insert(&mut self, blob: FileBlob) -> TreeResult<()> {
        let path =
            normalize_relative(&blob.path).ok_or_else(|| TreeError::InvalidPath(blob.path.clone()))?;
        if self.entries.contains_key(&path) {
            return Err(TreeError::DuplicatePath(path));
        }
        self.entries.insert(path.clone(), FileBlob { path, ..blob });
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&FileBlob> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileBlob)> {
        self.entries.iter().map(|(p, b)| (p.as_str(), b))
    }

    /// The `(path, blob)` pairs in path order, as the submit call takes them.
    pub fn into_entries(self) -> Vec<(String, FileBlob)> {
        self.entries.into_iter().collect()
    }

    /// Deterministic digest over every `(path, blob id)` pair.
    pub fn digest(&self) -> ObjectId {
        let ids: Vec<(String, ObjectId)> = self
            .entries
            .iter()
            .map(|(path, blob)| (path.clone(), blob_id(blob)))
            .collect();
        let parts: Vec<&[u8]> = ids
            .iter()
            .flat_map(|(path, id)| [path.as_bytes(), id.as_bytes().as_slice()])
            .collect();
        ContentHasher::TREE.hash_parts(&parts)
    }

    /// Total content bytes.
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(FileBlob::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(path: &str, content: &str) -> FileBlob {
        FileBlob::new(path, content, "text/plain")
    }

    #[test]
    fn insert_normalizes_and_rejects_duplicates() {
        let mut tree = Tree::new();
        tree.insert(blob("./a.txt", "a")).unwrap();
        assert_eq!(tree.get("a.txt").unwrap().path, "a.txt");
        assert_eq!(tree.insert(blob("a.txt", "again")), Err(TreeError::DuplicatePath("a.txt".into())));
        assert_eq!(tree.insert(blob("../x", "x")), Err(TreeError::InvalidPath("../x".into())));
    }

    #[test]
    fn digest_ignores_insertion_order() {
        let mut one = Tree::new();
        one.insert(blob("a.txt", "a")).unwrap();
        one.insert(blob("b.txt", "b")).unwrap();
        let mut two = Tree::new();
        two.insert(blob("b.txt", "b")).unwrap();
        two.insert(blob("a.txt", "a")).unwrap();
        assert_eq!(one.digest(), two.digest());
    }

    #[test]
    fn digest_tracks_content() {
        let mut one = Tree::new();
        one.insert(blob("a.txt", "a")).unwrap();
        let mut two = Tree::new();
        two.insert(blob("a.txt", "changed")).unwrap();
        assert_ne!(one.digest(), two.digest());
    }

    #[test]
    fn entries_are_path_ordered() {
        let mut tree = Tree::new();
        tree.insert(blob("z.txt", "z")).unwrap();
        tree.insert(blob("a/b.txt", "ab")).unwrap();
        let paths: Vec<String> = tree.into_entries().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a/b.txt", "z.txt"]);
    }

    #[test]
    fn blob_id_depends_on_path() {
        assert_ne!(blob_id(&blob("a.txt", "x")), blob_id(&blob("b.txt", "x")));
    }
}
