//! Client configuration.
//!
//! Resolved in layers, later layers winning:
//!
//! 1. Built-in defaults (the staging index under the per-user data directory).
//! 2. A TOML file: `$FERRY_CONFIG`, else `<config_dir>/ferry/config.toml` if
//!    it exists.
//! 3. Environment: `FERRY_REMOTE_URL`, `FERRY_INDEX_PATH`, `FERRY_CA_CERT`.
//! 4. Command-line flags, applied by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use ferry_index::INDEX_FILE_NAME;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SdkError, SdkResult};

pub const ENV_CONFIG: &str = "FERRY_CONFIG";
pub const ENV_REMOTE_URL: &str = "FERRY_REMOTE_URL";
pub const ENV_INDEX_PATH: &str = "FERRY_INDEX_PATH";
pub const ENV_CA_CERT: &str = "FERRY_CA_CERT";

pub(crate) const CONFIG_FILE_NAME: &str = "config.toml";

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub remote_url: Option<String>,
    pub index_path: Option<PathBuf>,
    pub ca_cert: Option<PathBuf>,
}

impl ConfigFile {
    pub fn parse(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn read(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))
    }
}

/// Resolved client settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote repository service.
    pub remote_url: Option<String>,
    /// Where the staging index persists.
    pub index_path: PathBuf,
    /// Extra PEM trust anchor for the remote's TLS certificate.
    pub ca_cert: Option<PathBuf>,
}

impl ClientConfig {
    /// Resolve from the process environment and the default config location.
    pub fn load() -> SdkResult<Self> {
        Self::resolve(|key| std::env::var(key).ok(), default_config_path())
    }

    /// Resolve with an explicit environment lookup and fallback config path.
    ///
    /// A file named by `FERRY_CONFIG` must exist; the fallback path is read
    /// only if present.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        fallback_file: Option<PathBuf>,
    ) -> SdkResult<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let file = match env(ENV_CONFIG) {
            Some(explicit) => Some(ConfigFile::read(Path::new(&explicit))?),
            None => match fallback_file {
                Some(path) if path.is_file() => Some(ConfigFile::read(&path)?),
                _ => None,
            },
        }
        .unwrap_or_default();

        let remote_url = env(ENV_REMOTE_URL).or(file.remote_url);
        let ca_cert = env(ENV_CA_CERT).map(PathBuf::from).or(file.ca_cert);
        let index_path = match env(ENV_INDEX_PATH).map(PathBuf::from).or(file.index_path) {
            Some(path) => path,
            None => default_index_path()?,
        };

        let config = Self {
            remote_url,
            index_path,
            ca_cert,
        };
        debug!(?config, "client configuration resolved");
        Ok(config)
    }

    pub fn with_remote_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.remote_url = url;
        }
        self
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "ferry-vcs", "ferry")
}

/// `<config_dir>/ferry/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join(CONFIG_FILE_NAME))
}

/// `<data_dir>/ferry/staged.json`.
pub fn default_index_path() -> SdkResult<PathBuf> {
    project_dirs()
        .map(|d| d.data_dir().join(INDEX_FILE_NAME))
        .ok_or_else(|| {
            SdkError::Config(format!(
                "cannot determine a per-user data directory; set {ENV_INDEX_PATH}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parse_full_file() {
        let file = ConfigFile::parse(
            "remote_url = \"https://vcs.example.org\"\nindex_path = \"/tmp/idx.json\"\nca_cert = \"/etc/ca.pem\"\n",
        )
        .unwrap();
        assert_eq!(file.remote_url.as_deref(), Some("https://vcs.example.org"));
        assert_eq!(file.index_path, Some(PathBuf::from("/tmp/idx.json")));
        assert_eq!(file.ca_cert, Some(PathBuf::from("/etc/ca.pem")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ConfigFile::parse("remote = \"x\"").unwrap_err();
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "remote_url = \"https://file.example\"\nindex_path = \"/from/file.json\"\n",
        )
        .unwrap();

        let config = ClientConfig::resolve(
            env_of(&[(ENV_REMOTE_URL, "https://env.example")]),
            Some(path),
        )
        .unwrap();
        assert_eq!(config.remote_url.as_deref(), Some("https://env.example"));
        assert_eq!(config.index_path, PathBuf::from("/from/file.json"));
        assert!(config.ca_cert.is_none());
    }

    #[test]
    fn explicit_config_must_exist() {
        let err = ClientConfig::resolve(env_of(&[(ENV_CONFIG, "/no/such/ferry.toml")]), None)
            .unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn missing_fallback_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::resolve(
            env_of(&[(ENV_INDEX_PATH, "/tmp/ferry-test/staged.json")]),
            Some(dir.path().join("absent.toml")),
        )
        .unwrap();
        assert_eq!(config.index_path, PathBuf::from("/tmp/ferry-test/staged.json"));
        assert!(config.remote_url.is_none());
    }

    #[test]
    fn flag_overrides_env_and_absent_flag_keeps_it() {
        let config = ClientConfig::resolve(
            env_of(&[(ENV_REMOTE_URL, "https://env.example"), (ENV_INDEX_PATH, "/i.json")]),
            None,
        )
        .unwrap();
        let config = config.with_remote_url(Some("https://flag.example".into()));
        assert_eq!(config.remote_url.as_deref(), Some("https://flag.example"));
        let config = config.with_remote_url(None);
        assert_eq!(config.remote_url.as_deref(), Some("https://flag.example"));
    }
}
