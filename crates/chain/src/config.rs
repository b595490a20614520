//! Ledger configuration.

use crate::ledger::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use tinyledger_consensus::ProofOfWork;
use tinyledger_core::Digest;

/// Per-ledger settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum transactions per block, also the miner's pool size.
    pub block_threshold: usize,
    /// Leading zeros required by proof of work.
    pub complexity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_threshold: 5,
            complexity: 3,
        }
    }
}

impl LedgerConfig {
    pub fn new(block_threshold: usize, complexity: usize) -> Self {
        Self {
            block_threshold,
            complexity,
        }
    }

    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_threshold == 0 {
            return Err(LedgerError::InvalidConfig(
                "block_threshold must be at least 1".to_string(),
            ));
        }
        if self.complexity > Digest::HEX_LEN {
            return Err(LedgerError::InvalidConfig(format!(
                "complexity must be at most {}",
                Digest::HEX_LEN
            )));
        }
        Ok(())
    }

    /// The proof-of-work strategy matching `complexity`.
    pub fn proof_of_work(&self) -> ProofOfWork {
        ProofOfWork::new(self.complexity)
    }
}
