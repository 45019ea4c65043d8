//! Homomorphic computation seam.
//!
//! The only implementation shipped is a stub that echoes a synthetic result; a real service
//! (a contract call, a coprocessor) plugs in behind `ComputationService`.

use crate::error::{Error, Result};
use crate::infra::clock::{Clock, SystemClock};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Compare,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Compare => "compare",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "compare" => Ok(Operation::Compare),
            _ => Err(Error::InvalidInput(
                "Invalid operation. Must be add, subtract, multiply, or compare".to_string(),
            )),
        }
    }
}

/// At least two operands, none empty.
pub fn validate_operands(operands: &[String]) -> Result<()> {
    if operands.len() < 2 || operands.iter().any(|op| op.trim().is_empty()) {
        return Err(Error::InvalidInput(
            "Invalid operands. Must provide at least 2 encrypted handles".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
pub trait ComputationService: Send + Sync {
    async fn compute(&self, operation: Operation, operands: &[String], bits: u32) -> Result<String>;
}

/// Returns `encrypted_result_<op>_<millis>` without touching the operands.
pub struct StubComputation {
    clock: Arc<dyn Clock>,
}

impl StubComputation {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for StubComputation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComputationService for StubComputation {
    async fn compute(&self, operation: Operation, operands: &[String], bits: u32) -> Result<String> {
        validate_operands(operands)?;
        info!(%operation, operands = operands.len(), bits, "stub computation");
        Ok(format!(
            "encrypted_result_{}_{}",
            operation,
            self.clock.now_millis()
        ))
    }
}
