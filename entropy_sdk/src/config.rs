//! Client configuration.
//!
//! Read from `ENTROPY_CLIENT_*` environment variables, e.g.
//! `ENTROPY_CLIENT_ENDPOINT=http://127.0.0.1:8899`.

use crate::error::Result;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the node
    pub endpoint: String,
    /// Identity label attached to submitted transactions
    pub signer: String,
    /// How long to wait for a confirmation receipt
    pub confirm_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8899".to_string(),
            signer: format!("harness-{:08x}", rand::random::<u32>()),
            confirm_timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::with_prefix("ENTROPY_CLIENT"))
    }

    /// Build from an explicit environment source over the defaults.
    pub fn from_environment(environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn with_signer(mut self, signer: impl Into<String>) -> Self {
        self.signer = signer.into();
        self
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }
}
