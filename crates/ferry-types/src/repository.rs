use serde::{Deserialize, Serialize};

use crate::ids::{CommitId, RepositoryId};

/// Repository metadata returned by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub id: RepositoryId,
    pub name: String,
    pub owner: String,
    pub is_public: bool,
    pub collaborators: Vec<String>,
    pub branches: Vec<BranchInfo>,
}

/// A branch pointer. `head` is `None` until the first commit lands on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub head: Option<CommitId>,
}

impl RepositoryInfo {
    pub fn branch(&self, name: &str) -> Option<&BranchInfo> {
        self.branches.iter().find(|b| b.name == name)
    }

    pub fn visibility(&self) -> &'static str {
        if self.is_public {
            "public"
        } else {
            "private"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> RepositoryInfo {
        RepositoryInfo {
            id: RepositoryId::new(3),
            name: "demo".into(),
            owner: "alice".into(),
            is_public: false,
            collaborators: vec![],
            branches: vec![
                BranchInfo { name: "main".into(), head: Some(CommitId::new("9").unwrap()) },
                BranchInfo { name: "dev".into(), head: None },
            ],
        }
    }

    #[test]
    fn branch_lookup() {
        let info = info();
        assert_eq!(info.branch("main").unwrap().head.as_ref().unwrap().as_str(), "9");
        assert!(info.branch("dev").unwrap().head.is_none());
        assert!(info.branch("missing").is_none());
    }

    #[test]
    fn visibility_label() {
        let mut info = info();
        assert_eq!(info.visibility(), "private");
        info.is_public = true;
        assert_eq!(info.visibility(), "public");
    }
}
