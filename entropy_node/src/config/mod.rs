// Configuration module for the Entropy Node
//
// Configuration is layered: built-in defaults, then an optional TOML file,
// then `ENTROPY_NODE__<SECTION>__<KEY>` environment variables
// (e.g. `ENTROPY_NODE__API__PORT=9000`).

use crate::error::{NodeError, Result};
use entropy::ProgramId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "ENTROPY_NODE";

/// Node configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// API configuration
    pub api: ApiConfig,
    /// Ledger configuration
    pub ledger: LedgerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API bind address
    pub bind_address: String,
    /// API port
    pub port: u16,
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Deployment identity of the hosted program
    pub program_id: ProgramId,
    /// Delay iterations `finalize` runs over the pool
    pub delay_iterations: u64,
    /// Snapshot file; the ledger is memory-only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8899,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            program_id: entropy::id(),
            delay_iterations: entropy::DEFAULT_DELAY_ITERATIONS,
            snapshot_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// `bind_address:port`
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl NodeConfig {
    /// Load defaults, overlay `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()?
            .try_deserialize::<NodeConfig>()
            .map_err(|e| NodeError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from a TOML file only
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&config_str)
            .map_err(|e| NodeError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;

        fs::write(path, config_str)
            .map_err(|e| NodeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
