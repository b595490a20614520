//! Core ledger primitives for tinyledger.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - SHA-256 hashing with hex-encoded digests
//! - Merkle trees over transaction digests
//! - Transactions
//! - Blocks and the block builder

pub mod block;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{Block, BlockBuilder, BlockError};
pub use hash::{hash, hash_concat, Digest};
pub use merkle::{merkle_root, MerkleTree};
pub use transaction::{MinimalTransaction, Transaction};
