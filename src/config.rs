//! Configuration
//!
//! `SessionOptions` is read from TOML. Every field is optional and falls
//! back to its default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::DEFAULT_MAX_LINES;
use crate::sandbox::SandboxLimits;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Whether the binary wires up a real HTTP client for `curl`.
    pub enabled: bool,
    pub timeout_ms: u64,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self { enabled: true, timeout_ms: 30_000 }
    }
}

impl NetworkOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Options for creating a `Session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Display lines retained.
    pub max_lines: usize,
    /// Start with `/hello_world.txt` and `/script.js`.
    pub seed: bool,
    pub sandbox: SandboxLimits,
    pub network: NetworkOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            seed: true,
            sandbox: SandboxLimits::default(),
            network: NetworkOptions::default(),
        }
    }
}

impl SessionOptions {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Load options from a TOML file.
pub fn load(path: &Path) -> Result<SessionOptions, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    SessionOptions::from_toml(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
