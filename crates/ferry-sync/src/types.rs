use std::fmt;

/// How `push` publishes the last local commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PushMode {
    /// Fetch the last commit and submit its tree and message again. Every
    /// push creates a new commit on the remote.
    #[default]
    Replay,
    /// Point the remote branch at the existing commit id.
    Reference,
}

impl fmt::Display for PushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replay => write!(f, "replay"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_is_default() {
        assert_eq!(PushMode::default(), PushMode::Replay);
    }

    #[test]
    fn display_names() {
        assert_eq!(PushMode::Replay.to_string(), "replay");
        assert_eq!(PushMode::Reference.to_string(), "reference");
    }
}
