use std::fs;
use std::path::{Path, PathBuf};

use ferry_index::StagingIndex;
use ferry_types::FileBlob;
use tracing::{debug, warn};

use crate::content_type::content_type_for;
use crate::tree::Tree;

/// A staged path left out of the tree, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedPath {
    pub path: String,
    pub reason: String,
}

/// Result of a build: the tree plus every path that had to be skipped.
#[derive(Clone, Debug, Default)]
pub struct TreeBuild {
    pub tree: Tree,
    pub skipped: Vec<SkippedPath>,
}

impl TreeBuild {
    /// `true` if at least one staged path made it into the tree.
    pub fn has_content(&self) -> bool {
        !self.tree.is_empty()
    }
}

/// Reads staged files from a working copy.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: PathBuf,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read every staged path and assemble the tree.
    pub fn build(&self, index: &StagingIndex) -> TreeBuild {
        self.build_paths(index.paths())
    }

    pub fn build_paths<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> TreeBuild {
        let mut result = TreeBuild::default();

        for path in paths {
            match self.read_blob(path) {
                Ok(blob) => {
                    if let Err(err) = result.tree.insert(blob) {
                        warn!(path, error = %err, "skipping staged path");
                        result.skipped.push(SkippedPath {
                            path: path.to_string(),
                            reason: err.to_string(),
                        });
                    }
                }
                Err(reason) => {
                    warn!(path, %reason, "skipping unreadable staged file");
                    result.skipped.push(SkippedPath {
                        path: path.to_string(),
                        reason,
                    });
                }
            }
        }

        debug!(
            files = result.tree.len(),
            skipped = result.skipped.len(),
            bytes = result.tree.total_bytes(),
            "tree built"
        );
        result
    }

    fn read_blob(&self, path: &str) -> Result<FileBlob, String> {
        let content = fs::read_to_string(self.root.join(path)).map_err(|e| e.to_string())?;
        Ok(FileBlob::new(path, content, content_type_for(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, StagingIndex) {
        let dir = tempfile::tempdir().unwrap();
        let mut index = StagingIndex::new(dir.path().join("staged.json"));
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
            index.add_paths([*rel]).unwrap();
        }
        (dir, index)
    }

    #[test]
    fn builds_blobs_for_every_staged_file() {
        let (dir, index) = setup(&[("a.txt", "alpha"), ("src/main.rs", "fn main() {}")]);
        let build = TreeBuilder::new(dir.path()).build(&index);

        assert!(build.skipped.is_empty());
        assert_eq!(build.tree.len(), 2);
        let main = build.tree.get("src/main.rs").unwrap();
        assert_eq!(main.content, "fn main() {}");
        assert_eq!(main.content_type, "text/x-rust");
    }

    #[test]
    fn missing_file_is_skipped_not_fatal() {
        let (dir, mut index) = setup(&[("a.txt", "alpha")]);
        index.add_paths(["gone.txt"]).unwrap();

        let build = TreeBuilder::new(dir.path()).build(&index);
        assert_eq!(build.tree.len(), 1);
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].path, "gone.txt");
        assert!(build.has_content());
    }

    #[test]
    fn non_utf8_file_is_skipped() {
        let (dir, mut index) = setup(&[]);
        fs::write(dir.path().join("bin.dat"), [0xff, 0xfe, 0x00]).unwrap();
        index.add_paths(["bin.dat"]).unwrap();

        let build = TreeBuilder::new(dir.path()).build(&index);
        assert!(!build.has_content());
        assert_eq!(build.skipped[0].path, "bin.dat");
    }

    #[test]
    fn same_content_same_digest() {
        let (dir, index) = setup(&[("a.txt", "alpha"), ("b.txt", "beta")]);
        let builder = TreeBuilder::new(dir.path());
        assert_eq!(builder.build(&index).tree.digest(), builder.build(&index).tree.digest());
    }
}
