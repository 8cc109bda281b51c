//! Relative path normalization shared by the staging index and clone.

/// Normalize a working-copy relative path to forward slashes.
///
/// Strips `./` prefixes and empty or `.` segments. Returns `None` for paths
/// that are empty after normalization, absolute, or that climb out of the
/// working copy through `..`.
///
/// `\` is a separator only on Windows. Elsewhere it is an ordinary file-name
/// character and is kept as is.
pub fn normalize_relative(path: &str) -> Option<String> {
    let unified = if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    };
    if unified.starts_with('/') || (cfg!(windows) && has_drive_prefix(&unified)) {
        return None;
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_dot_prefix_and_empty_segments() {
        assert_eq!(normalize_relative("./src/main.rs").as_deref(), Some("src/main.rs"));
        assert_eq!(normalize_relative("a//b/./c").as_deref(), Some("a/b/c"));
    }

    #[cfg(windows)]
    #[test]
    fn backslash_is_a_separator_on_windows() {
        assert_eq!(normalize_relative(".\\src\\main.rs").as_deref(), Some("src/main.rs"));
        assert_eq!(normalize_relative("..\\secret"), None);
        assert_eq!(normalize_relative("C:/Windows"), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn backslash_is_part_of_the_name_elsewhere() {
        assert_eq!(normalize_relative("we\\ird.txt").as_deref(), Some("we\\ird.txt"));
        assert_eq!(normalize_relative("./dir/a\\b").as_deref(), Some("dir/a\\b"));
        assert_eq!(normalize_relative("..\\x").as_deref(), Some("..\\x"));
    }

    #[test]
    fn rejects_escaping_and_absolute_paths() {
        assert_eq!(normalize_relative("../secret"), None);
        assert_eq!(normalize_relative("a/../../b"), None);
        assert_eq!(normalize_relative("/etc/passwd"), None);
        assert_eq!(normalize_relative("."), None);
        assert_eq!(normalize_relative(""), None);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(path in "[a-z./\\\\]{0,24}") {
            if let Some(once) = normalize_relative(&path) {
                prop_assert_eq!(normalize_relative(&once), Some(once.clone()));
                if cfg!(windows) {
                    prop_assert!(!once.contains('\\'));
                }
                prop_assert!(!once.starts_with('/'));
            }
        }
    }
}
