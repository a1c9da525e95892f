//! # Entropy SDK
//!
//! Client shim and test harness for the entropy program.
//!
//! * [`Submitter`]: channel to a ledger, in-process ([`LocalSubmitter`]) or
//!   over HTTP to an `entropy-node` ([`HttpSubmitter`])
//! * [`EntropyClient`]: `initialize` / `prime` with bounded confirmation
//! * [`Scenario`]: sequential instruction runs that log each transaction
//!   signature and stop at the first failure
//!
//! ```rust,no_run
//! use entropy_sdk::{ClientConfig, EntropyClient, HttpSubmitter, Scenario};
//!
//! async fn example() -> entropy_sdk::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let submitter = HttpSubmitter::new(&config.endpoint, config.confirm_timeout())?;
//!     let client = EntropyClient::new(submitter, &config);
//!     let report = Scenario::standard().run(&client).await?;
//!     assert_eq!(report.receipts.len(), 3);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod harness;
pub mod submitter;

pub use client::EntropyClient;
pub use crate::config::ClientConfig;
pub use error::{Result, SdkError};
pub use harness::{Scenario, ScenarioReport};
pub use submitter::{HttpSubmitter, LocalSubmitter, Submitter};

/// Current version of the Entropy SDK
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
