//! Block structure and builder.

use crate::hash::{hash_concat, Digest};
use crate::merkle::MerkleTree;
use crate::transaction::Transaction;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during block operations.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("invalid transaction: digest {digest} does not match its payload")]
    InvalidTransaction { digest: Digest },
}

pub type Result<T> = std::result::Result<T, BlockError>;

/// A block of transactions linked to its predecessor by digest.
///
/// The digest, Merkle root and transaction count are derived fields: every
/// mutation recomputes them before returning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain (0 for genesis).
    id: u64,
    /// Digest of this block.
    digest: Digest,
    /// Digest of the previous block.
    previous_digest: Digest,
    /// Transactions in insertion order.
    transactions: Vec<Transaction>,
    /// Creation time in milliseconds since the Unix epoch.
    timestamp: i64,
    /// Search variable for mining.
    nonce: u64,
    /// Number of transactions stored.
    tx_count: usize,
    /// Merkle root of the transaction digests.
    merkle_root: Digest,
}

impl Block {
    /// Create an empty block.
    pub fn new(id: u64, previous_digest: Digest, nonce: u64, timestamp: i64) -> Self {
        let mut block = Self {
            id,
            digest: Digest::placeholder(),
            previous_digest,
            transactions: Vec::new(),
            timestamp,
            nonce,
            tx_count: 0,
            merkle_root: Digest::placeholder(),
        };
        block.recompute_digest();
        block
    }

    /// Get the current time in milliseconds since the Unix epoch.
    pub fn current_timestamp() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Append a transaction, then refresh the Merkle root, count and digest.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        if !tx.verify_digest() {
            return Err(BlockError::InvalidTransaction {
                digest: tx.digest().clone(),
            });
        }

        self.transactions.push(tx);
        self.merkle_root = self.merkle_tree().root();
        self.tx_count = self.transactions.len();
        self.recompute_digest();
        Ok(())
    }

    /// Calculate the digest over the block's content.
    ///
    /// The field order is fixed: previous digest, timestamp, nonce, the
    /// transactions as compact JSON, transaction count, Merkle root.
    pub fn compute_digest(&self) -> Digest {
        let transactions =
            serde_json::to_string(&self.transactions).expect("serialization should not fail");
        hash_concat(&[
            self.previous_digest.as_bytes(),
            self.timestamp.to_string().as_bytes(),
            self.nonce.to_string().as_bytes(),
            transactions.as_bytes(),
            self.tx_count.to_string().as_bytes(),
            self.merkle_root.as_bytes(),
        ])
    }

    /// Store the freshly computed digest.
    pub fn recompute_digest(&mut self) {
        self.digest = self.compute_digest();
    }

    /// Advance the nonce by one and refresh the digest.
    pub fn increment_nonce(&mut self) {
        self.nonce = self.nonce.wrapping_add(1);
        self.recompute_digest();
    }

    /// Build the Merkle tree over the current transaction digests.
    pub fn merkle_tree(&self) -> MerkleTree {
        let digests: Vec<Digest> = self
            .transactions
            .iter()
            .map(|tx| tx.digest().clone())
            .collect();
        MerkleTree::new(&digests)
    }

    /// Verify the stored Merkle root matches the transactions.
    pub fn validate_transactions(&self) -> bool {
        self.merkle_tree().root() == self.merkle_root
    }

    /// Verify the stored digest matches the block content.
    pub fn verify_digest(&self) -> bool {
        self.compute_digest() == self.digest
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn previous_digest(&self) -> &Digest {
        &self.previous_digest
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn tx_count(&self) -> usize {
        self.tx_count
    }

    pub fn merkle_root(&self) -> &Digest {
        &self.merkle_root
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.id == 0 && self.previous_digest.is_placeholder()
    }
}

/// Builder for blocks, defaulting to a `"0"` previous digest, nonce 0 and the
/// current time.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    id: u64,
    previous_digest: Digest,
    nonce: u64,
    timestamp: Option<i64>,
}

impl BlockBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            previous_digest: Digest::placeholder(),
            nonce: 0,
            timestamp: None,
        }
    }

    pub fn previous_digest(mut self, digest: Digest) -> Self {
        self.previous_digest = digest;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> Block {
        let timestamp = self.timestamp.unwrap_or_else(Block::current_timestamp);
        Block::new(self.id, self.previous_digest, self.nonce, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    fn fixed_block(id: u64) -> Block {
        BlockBuilder::new(id).timestamp(1_700_000_000_000).build()
    }

    #[test]
    fn test_new_block_is_empty() {
        let block = fixed_block(0);

        assert!(block.is_genesis());
        assert_eq!(block.tx_count(), 0);
        assert!(block.transactions().is_empty());
        assert_eq!(block.merkle_root(), &Digest::placeholder());
        assert!(block.verify_digest());
        assert!(block.validate_transactions());
    }

    #[test]
    fn test_digest_field_order() {
        let block = fixed_block(3);
        let expected = hash(b"017000000000000[]00");
        assert_eq!(block.digest(), &expected);
    }

    #[test]
    fn test_block_hash_deterministic() {
        assert_eq!(fixed_block(1).digest(), fixed_block(1).digest());
    }

    #[test]
    fn test_add_transaction_updates_derived_fields() {
        let mut block = fixed_block(1);
        let before = block.digest().clone();

        block.add_transaction(Transaction::minimal("a")).unwrap();

        assert_eq!(block.tx_count(), 1);
        assert_eq!(block.merkle_root(), &hash(b"a"));
        assert_ne!(block.digest(), &before);
        assert!(block.verify_digest());
        assert!(block.validate_transactions());
    }

    #[test]
    fn test_validate_after_every_insert() {
        let mut block = fixed_block(1);
        for i in 0..7 {
            block
                .add_transaction(Transaction::minimal(format!("tx-{i}")))
                .unwrap();
            assert!(block.validate_transactions());
            assert!(block.verify_digest());
            assert_eq!(block.tx_count(), block.transactions().len());
        }
    }

    #[test]
    fn test_rejects_forged_transaction() {
        let mut json = serde_json::to_value(Transaction::minimal("honest")).unwrap();
        json["value"] = "forged".into();
        let forged: Transaction = serde_json::from_value(json).unwrap();

        let mut block = fixed_block(1);
        let before = block.clone();
        let err = block.add_transaction(forged).unwrap_err();

        assert!(matches!(err, BlockError::InvalidTransaction { .. }));
        assert_eq!(block, before);
    }

    #[test]
    fn test_increment_nonce_changes_digest() {
        let mut block = fixed_block(1);
        let before = block.digest().clone();

        block.increment_nonce();

        assert_eq!(block.nonce(), 1);
        assert_ne!(block.digest(), &before);
        assert!(block.verify_digest());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = fixed_block(1);
        original.add_transaction(Transaction::minimal("a")).unwrap();
        let copy = original.clone();

        original.add_transaction(Transaction::minimal("b")).unwrap();

        assert_eq!(copy.tx_count(), 1);
        assert_eq!(original.tx_count(), 2);
        assert_ne!(copy.digest(), original.digest());
    }

    #[test]
    fn test_tampered_digest_detected() {
        let block = fixed_block(1);
        let mut json = serde_json::to_value(&block).unwrap();
        json["digest"] = hash(b"bogus").as_str().into();
        let tampered: Block = serde_json::from_value(json).unwrap();

        assert!(!tampered.verify_digest());
        assert!(tampered.validate_transactions());
    }

    #[test]
    fn test_builder_defaults() {
        let block = BlockBuilder::new(4)
            .previous_digest(hash(b"parent"))
            .nonce(9)
            .build();

        assert_eq!(block.id(), 4);
        assert_eq!(block.nonce(), 9);
        assert_eq!(block.previous_digest(), &hash(b"parent"));
        assert!(!block.is_genesis());
        assert!(block.timestamp() > 0);
    }
}
