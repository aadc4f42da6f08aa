//! Engine configuration loaded from TOML.
//!
//! ```toml
//! mode = "jit"
//! log_level = "debug"
//! max_call_depth = 64
//!
//! [host]
//! echo = true
//! clipboard = "hello"
//! windows = ["Editor", "Terminal"]
//! ```
//!
//! Every key is optional. A missing file means defaults; a file that does
//! not parse is an error.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{engine::ExecutionMode, host::RecordingHost, interpreter::DEFAULT_MAX_CALL_DEPTH};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for the in-memory host used by the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Print injected keystrokes to stdout
    pub echo: bool,
    /// Initial clipboard text
    pub clipboard: String,
    /// Simulated window titles, first one focused
    pub windows: Vec<String>,
}

impl HostConfig {
    pub fn build(&self) -> RecordingHost {
        RecordingHost::new()
            .with_clipboard(self.clipboard.clone())
            .with_windows(self.windows.iter().cloned())
            .with_echo(self.echo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: ExecutionMode,
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_level: String,
    pub max_call_depth: usize,
    pub host: HostConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mode: ExecutionMode::default(),
            log_level: "warn".to_string(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            host: HostConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: EngineConfig = toml::from_str("mode = \"ahead-of-time\"\n[host]\necho = true").unwrap();
        assert_eq!(config.mode, ExecutionMode::AheadOfTime);
        assert!(config.host.echo);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = EngineConfig::load("/nonexistent/hotkey.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(toml::from_str::<EngineConfig>(&text).unwrap(), config);
    }
}
