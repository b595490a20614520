//! The mining strategy capability.

use std::fmt::Debug;
use thiserror::Error;
use tinyledger_core::{Block, Digest};

/// Errors that can occur while checking or searching for a valid digest.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("invalid hash {digest:?}: too short for complexity {complexity}")]
    InvalidHash { digest: Digest, complexity: usize },
}

pub type Result<T> = std::result::Result<T, MiningError>;

/// Defines what makes a block digest valid and how to reach one.
pub trait MiningStrategy: Debug + Send + Sync {
    /// Mutate `block` in place until its digest is valid.
    ///
    /// A block that is already valid is left untouched. The search runs to
    /// completion on the calling thread and cannot be cancelled.
    fn mine(&self, block: &mut Block) -> Result<()>;

    /// Check whether `digest` satisfies this strategy.
    fn validate_hash(&self, digest: &Digest) -> Result<bool>;

    /// Short human-readable description.
    fn name(&self) -> String;
}
