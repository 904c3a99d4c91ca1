// File: src/config.rs
//
// Configuration for the sprout command-line tool, loaded from TOML.
// Every key is optional; flags given on the command line take precedence
// over whatever the file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "sprout.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// How `--print-state` renders the final bindings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StateFormat {
    /// `name = value`, one binding per line
    #[default]
    Text,
    /// A JSON object keyed by name
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub print_state: bool,
    pub format: StateFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// An `EnvFilter` directive such as `sprout=debug`
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub dir: PathBuf,
}

impl Default for TestConfig {
    fn default() -> Self {
        TestConfig { dir: PathBuf::from("tests/scripts") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Colored terminal output
    pub color: bool,
    pub run: RunConfig,
    pub log: LogConfig,
    pub test: TestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config { color: true, run: RunConfig::default(), log: LogConfig::default(), test: TestConfig::default() }
    }
}

impl Config {
    /// Loads `explicit` if given (it must exist), otherwise `sprout.toml`
    /// in `cwd` when present, otherwise the defaults
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&data).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_default_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.color);
        assert_eq!(config.test.dir, PathBuf::from("tests/scripts"));
    }

    #[test]
    fn test_reads_sprout_toml_from_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "color = false\n[run]\nprint_state = true\nformat = \"json\"\n[log]\nfilter = \"sprout=trace\"\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert!(!config.color);
        assert_eq!(config.run, RunConfig { print_state: true, format: StateFormat::Json });
        assert_eq!(config.log.filter.as_deref(), Some("sprout=trace"));
        assert_eq!(config.test, TestConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[run]\nprint_sate = true\n").unwrap();
        assert!(matches!(Config::load(Some(&path), dir.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&missing), dir.path()), Err(ConfigError::Read { .. })));
    }
}
