//! Tunable session parameters loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while loading or validating a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read session config at {}", .path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file contents were not valid TOML for this schema.
    #[error("failed to parse session config")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but falls outside its accepted range.
    #[error("invalid session config: {0}")]
    Invalid(&'static str),
}

/// Parameters that shape a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Rows and columns of the square grid.
    pub grid_size: u32,
    /// Seed for the session RNG; drawn from entropy when absent.
    pub seed: Option<u64>,
    /// Upper bound on cells revealed per chain.
    pub max_chain_length: u32,
    /// Boxed-in growth attempts tolerated before a chain stops early.
    pub max_failed_attempts: u32,
    /// Delay between consecutive member animations of one group.
    pub animation_stagger_ms: u64,
    /// Delay between reaching full completion and entering the victory state.
    pub victory_grace_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            seed: None,
            max_chain_length: 20,
            max_failed_attempts: 100,
            animation_stagger_ms: 50,
            victory_grace_ms: 1_000,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::Invalid("grid_size must be positive"));
        }
        if self.max_chain_length == 0 {
            return Err(ConfigError::Invalid("max_chain_length must be positive"));
        }
        Ok(())
    }

    pub(crate) fn animation_stagger(&self) -> Duration {
        Duration::from_millis(self.animation_stagger_ms)
    }

    pub(crate) fn victory_grace(&self) -> Duration {
        Duration::from_millis(self.victory_grace_ms)
    }
}
