//! Configuration module for cumulus.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation and defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for cumulus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub apply: ApplyConfig,
    pub logging: LoggingConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root directory of the local tree.
    pub root: PathBuf,
    /// Root directory of the mirror store acting as the remote side.
    pub remote_root: PathBuf,
    /// Entries whose name starts with this prefix are never synced.
    pub hidden_prefix: String,
}

/// Change application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Maximum number of changes applied concurrently.
    pub max_concurrent: usize,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/cumulus/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("cumulus")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Cumulus"),
            remote_root: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("cumulus")
                .join("mirror"),
            hidden_prefix: ".".to_string(),
        }
    }
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sync.hidden_prefix, ".");
        assert_eq!(config.apply.max_concurrent, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_full_file() {
        let yaml = r#"
sync:
  root: /home/user/Cumulus
  remote_root: /srv/mirror
  hidden_prefix: "_"
apply:
  max_concurrent: 8
logging:
  level: debug
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sync.root, PathBuf::from("/home/user/Cumulus"));
        assert_eq!(config.sync.remote_root, PathBuf::from("/srv/mirror"));
        assert_eq!(config.sync.hidden_prefix, "_");
        assert_eq!(config.apply.max_concurrent, 8);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let yaml = r#"
sync:
  root: /data/tree
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sync.root, PathBuf::from("/data/tree"));
        assert_eq!(config.sync.hidden_prefix, ".");
        assert_eq!(config.apply.max_concurrent, 4);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.yaml"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.apply.max_concurrent, config.apply.max_concurrent);
    }
}
