use serde::{Deserialize, Serialize};

/// A single file ready for submission to the remote service.
///
/// Blobs are transient: the tree builder produces them from the staged paths
/// and they live only as long as one submit call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBlob {
    /// Working-copy relative path, slash-normalized.
    pub path: String,
    /// Raw text content.
    pub content: String,
    /// Content type derived from the path's extension; empty when there is none.
    pub content_type: String,
}

impl FileBlob {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
