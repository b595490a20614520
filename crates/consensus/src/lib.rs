//! Mining strategies for tinyledger.
//!
//! A [`MiningStrategy`] decides which block digests count as mined and how to
//! search for one. The ledger and miner only talk to the trait, so new
//! strategies plug in without touching them.
//!
//! # Example
//!
//! ```rust
//! use tinyledger_consensus::{MiningStrategy, ProofOfWork};
//! use tinyledger_core::{BlockBuilder, Transaction};
//!
//! let pow = ProofOfWork::new(1);
//! let mut block = BlockBuilder::new(0).build();
//! block.add_transaction(Transaction::minimal("GENESIS")).unwrap();
//!
//! pow.mine(&mut block).unwrap();
//! assert!(pow.validate_hash(block.digest()).unwrap());
//! ```

pub mod pow;
pub mod strategy;

// Re-export commonly used types
pub use pow::ProofOfWork;
pub use strategy::{MiningError, MiningStrategy};
