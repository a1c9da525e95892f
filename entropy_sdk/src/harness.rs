//! # Scenario runner
//!
//! Runs a fixed sequence of instructions through an [`EntropyClient`],
//! strictly one after another. Each confirmed step logs its transaction
//! signature; the first failure aborts the run.

use crate::client::EntropyClient;
use crate::error::{Result, SdkError};
use crate::submitter::Submitter;
use entropy::{Instruction, Receipt};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    steps: Vec<Instruction>,
}

/// Receipts of a completed scenario, in step order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    pub receipts: Vec<Receipt>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// `initialize` followed by two `prime`s.
    pub fn standard() -> Self {
        Self::new("initialize-and-prime")
            .initialize()
            .prime()
            .prime()
    }

    pub fn initialize(self) -> Self {
        self.step(Instruction::Initialize)
    }

    pub fn prime(self) -> Self {
        self.step(Instruction::Prime)
    }

    pub fn finalize(self) -> Self {
        self.step(Instruction::Finalize)
    }

    pub fn step(mut self, instruction: Instruction) -> Self {
        self.steps.push(instruction);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Instruction] {
        &self.steps
    }

    pub async fn run<S: Submitter>(&self, client: &EntropyClient<S>) -> Result<ScenarioReport> {
        info!(scenario = %self.name, steps = self.steps.len(), "Running scenario");

        let mut receipts = Vec::with_capacity(self.steps.len());
        for (index, instruction) in self.steps.iter().enumerate() {
            let step = format!("#{} {}", index + 1, instruction);
            let outcome = match instruction {
                Instruction::Initialize => client.initialize().await,
                Instruction::Prime => client.prime().await,
                Instruction::Finalize => client.finalize().await,
            };

            match outcome {
                Ok(receipt) => {
                    info!("Your transaction signature {}", receipt.transaction_id);
                    receipts.push(receipt);
                }
                Err(err) => {
                    error!(scenario = %self.name, %step, error = %err, "Scenario aborted");
                    return Err(SdkError::Scenario {
                        step,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(ScenarioReport {
            name: self.name.clone(),
            receipts,
        })
    }
}
