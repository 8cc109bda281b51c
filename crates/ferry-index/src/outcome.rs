//! Results reported by staging operations.

/// A working-copy entry that was skipped with a warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

impl SkippedEntry {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Partition of the paths an add call was asked to stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagingOutcome {
    /// Paths inserted by this call.
    pub added: Vec<String>,
    /// Paths that were already in the index; left untouched.
    pub already_staged: Vec<String>,
    /// Entries that could not be enumerated.
    pub skipped: Vec<SkippedEntry>,
}

impl StagingOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the call changed the index.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }

    /// Number of paths the call matched, staged or not.
    pub fn matched(&self) -> usize {
        self.added.len() + self.already_staged.len()
    }

    pub fn merge(&mut self, other: StagingOutcome) {
        self.added.extend(other.added);
        self.already_staged.extend(other.already_staged);
        self.skipped.extend(other.skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates() {
        let mut a = StagingOutcome {
            added: vec!["a.txt".into()],
            ..Default::default()
        };
        a.merge(StagingOutcome {
            already_staged: vec!["b.txt".into()],
            skipped: vec![SkippedEntry::new("c", "denied")],
            ..Default::default()
        });
        assert_eq!(a.matched(), 2);
        assert!(a.changed());
        assert_eq!(a.skipped.len(), 1);
    }
}
