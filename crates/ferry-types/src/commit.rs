use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blob::FileBlob;
use crate::ids::CommitId;

/// A commit as recorded by the remote service.
///
/// The tree is an ordered mapping from path to blob. The client reads these
/// records (for push replay and clone) but never mints one itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSnapshot {
    pub id: CommitId,
    pub tree: BTreeMap<String, FileBlob>,
    pub parent: Option<CommitId>,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitSnapshot {
    /// The tree as the ordered `(path, blob)` pairs the submit call expects.
    pub fn tree_entries(&self) -> Vec<(String, FileBlob)> {
        self.tree
            .iter()
            .map(|(path, blob)| (path.clone(), blob.clone()))
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.tree.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_entries_are_path_ordered() {
        let mut tree = BTreeMap::new();
        tree.insert("b.txt".to_string(), FileBlob::new("b.txt", "b", "text/plain"));
        tree.insert("a.txt".to_string(), FileBlob::new("a.txt", "a", "text/plain"));
        let snapshot = CommitSnapshot {
            id: CommitId::new("1").unwrap(),
            tree,
            parent: None,
            message: "first".into(),
            author: "tester".into(),
            timestamp: Utc::now(),
        };

        let paths: Vec<String> = snapshot.tree_entries().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
        assert_eq!(snapshot.file_count(), 2);
    }
}
