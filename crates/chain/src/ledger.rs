//! The ledger: an append-only chain of blocks.
//!
//! The chain always holds a genesis block at index 0, and every later block
//! carries its predecessor's digest. The genesis block is built unmined; the
//! caller mines it (with complexity 0 it is valid from the start).

use crate::config::LedgerConfig;
use std::fmt;
use thiserror::Error;
use tinyledger_consensus::{MiningError, MiningStrategy};
use tinyledger_core::{Block, BlockBuilder, BlockError, Transaction};
use tracing::{debug, info, warn};

/// Payload of the placeholder transaction stored in the genesis block.
pub const GENESIS_PAYLOAD: &str = "GENESIS";

/// The rule a block broke during chain validation or append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// The stored digest differs from the recomputed one.
    DigestMismatch,
    /// The stored Merkle root differs from the one rebuilt from transactions.
    MerkleRootMismatch,
    /// The stored transaction count differs from the transactions held.
    TxCountMismatch,
    /// The previous digest does not match the preceding block.
    LinkageMismatch,
    /// The digest does not satisfy the mining strategy.
    Unmined,
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::DigestMismatch => "own digest mismatch",
            Self::MerkleRootMismatch => "merkle root mismatch",
            Self::TxCountMismatch => "transaction count mismatch",
            Self::LinkageMismatch => "previous digest mismatch",
            Self::Unmined => "block is not mined",
        };
        f.write_str(reason)
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidTransaction(#[from] BlockError),

    #[error("chain integrity error at block {block_id}: {violation}")]
    ChainIntegrity {
        block_id: u64,
        violation: IntegrityViolation,
    },

    #[error("block {0} is already mined")]
    AlreadyMined(u64),

    #[error("invalid block id {id} (chain length {len})")]
    InvalidBlockReference { id: u64, len: usize },

    #[error("no saved state available")]
    NoSavedState,

    #[error("the chain is empty")]
    EmptyChain,

    #[error("mining error: {0}")]
    Mining(#[from] MiningError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// An opaque, deep copy of the chain at a point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    blocks: Vec<Block>,
}

impl Snapshot {
    /// Number of blocks captured.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// The chain of blocks together with its mining strategy.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    strategy: Box<dyn MiningStrategy>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger holding an unmined genesis block.
    pub fn new(config: LedgerConfig, strategy: Box<dyn MiningStrategy>) -> Result<Self> {
        config.validate()?;

        let mut genesis = BlockBuilder::new(0).build();
        genesis.add_transaction(Transaction::minimal(GENESIS_PAYLOAD))?;
        info!(
            strategy = %strategy.name(),
            threshold = config.block_threshold,
            genesis = %genesis.digest(),
            "created ledger"
        );

        Ok(Self {
            chain: vec![genesis],
            strategy,
            config,
        })
    }

    /// Build a ledger around an existing chain. The chain is not validated.
    pub fn from_blocks(
        config: LedgerConfig,
        strategy: Box<dyn MiningStrategy>,
        blocks: Vec<Block>,
    ) -> Result<Self> {
        config.validate()?;
        if blocks.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        Ok(Self {
            chain: blocks,
            strategy,
            config,
        })
    }

    /// Build a ledger from a chain exported with [`Ledger::to_json`].
    pub fn from_json(
        config: LedgerConfig,
        strategy: Box<dyn MiningStrategy>,
        text: &str,
    ) -> Result<Self> {
        let blocks: Vec<Block> = serde_json::from_str(text)?;
        Self::from_blocks(config, strategy, blocks)
    }

    /// Render the whole chain as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.chain)?)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn strategy(&self) -> &dyn MiningStrategy {
        self.strategy.as_ref()
    }

    /// Swap the mining strategy. Existing blocks are left as they are.
    pub fn set_strategy(&mut self, strategy: Box<dyn MiningStrategy>) {
        info!(strategy = %strategy.name(), "mining strategy replaced");
        self.strategy = strategy;
    }

    /// Number of blocks in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Total transactions across all blocks.
    pub fn transaction_count(&self) -> usize {
        self.chain.iter().map(Block::tx_count).sum()
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    fn last_block_mut(&mut self) -> Result<&mut Block> {
        self.chain.last_mut().ok_or(LedgerError::EmptyChain)
    }

    fn index_of(&self, id: u64) -> Result<usize> {
        usize::try_from(id)
            .ok()
            .filter(|&index| index < self.chain.len())
            .ok_or(LedgerError::InvalidBlockReference {
                id,
                len: self.chain.len(),
            })
    }

    /// Get a block by id.
    pub fn block(&self, id: u64) -> Result<&Block> {
        let index = self.index_of(id)?;
        Ok(&self.chain[index])
    }

    /// Borrow a block mutably alongside the strategy that mines it.
    pub(crate) fn block_with_strategy(
        &mut self,
        id: u64,
    ) -> Result<(&mut Block, &dyn MiningStrategy)> {
        let index = self.index_of(id)?;
        Ok((&mut self.chain[index], self.strategy.as_ref()))
    }

    /// Whether the block's digest satisfies the current strategy.
    pub fn is_mined(&self, id: u64) -> Result<bool> {
        let block = self.block(id)?;
        Ok(self.strategy.validate_hash(block.digest())?)
    }

    /// Append a new empty block linked to the current last block.
    ///
    /// Returns the new block's id.
    pub fn create_block(&mut self) -> Result<u64> {
        let previous = self.last_block()?.digest().clone();
        let id = self.chain.len() as u64;
        let block = BlockBuilder::new(id).previous_digest(previous).build();
        self.add_block(block)?;
        debug!(block = id, "created block");
        Ok(id)
    }

    /// Append a block whose previous digest matches the last block.
    pub fn add_block(&mut self, block: Block) -> Result<()> {
        let last = self.last_block()?;
        if block.previous_digest() != last.digest() {
            warn!(
                block = block.id(),
                expected = %last.digest(),
                got = %block.previous_digest(),
                "rejected block with broken linkage"
            );
            return Err(LedgerError::ChainIntegrity {
                block_id: block.id(),
                violation: IntegrityViolation::LinkageMismatch,
            });
        }
        self.chain.push(block);
        Ok(())
    }

    /// Add a transaction to the last block.
    ///
    /// A last block that is full, or already mined, is never touched: a new
    /// block is created first. A fresh block is neither full nor mutated
    /// before insertion, so at most one block is created per call.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        if !tx.verify_digest() {
            return Err(BlockError::InvalidTransaction {
                digest: tx.digest().clone(),
            }
            .into());
        }

        let last = self.last_block()?;
        let full = last.tx_count() >= self.config.block_threshold;
        if full || self.strategy.validate_hash(last.digest())? {
            debug!(block = last.id(), full, "last block closed, rolling to a new one");
            self.create_block()?;
        }

        let block = self.last_block_mut()?;
        block.add_transaction(tx)?;
        debug!(block = block.id(), tx_count = block.tx_count(), "transaction added");
        Ok(())
    }

    fn check_block(&self, block: &Block, previous: Option<&Block>) -> Result<()> {
        let violation = if !block.verify_digest() {
            Some(IntegrityViolation::DigestMismatch)
        } else if !block.validate_transactions() {
            Some(IntegrityViolation::MerkleRootMismatch)
        } else if block.tx_count() != block.transactions().len() {
            Some(IntegrityViolation::TxCountMismatch)
        } else if previous.is_some_and(|prev| block.previous_digest() != prev.digest()) {
            Some(IntegrityViolation::LinkageMismatch)
        } else if !self.strategy.validate_hash(block.digest())? {
            Some(IntegrityViolation::Unmined)
        } else {
            None
        };

        match violation {
            Some(violation) => {
                warn!(block = block.id(), %violation, "chain validation failed");
                Err(LedgerError::ChainIntegrity {
                    block_id: block.id(),
                    violation,
                })
            }
            None => Ok(()),
        }
    }

    /// Check every block from genesis onward.
    ///
    /// For each block, in order: own digest, Merkle root, transaction count,
    /// linkage to the
    /// previous block (skipped for genesis), mined under the current
    /// strategy.
    /// The first failure is returned as [`LedgerError::ChainIntegrity`].
    pub fn validate_chain(&self) -> Result<bool> {
        let genesis = self.chain.first().ok_or(LedgerError::EmptyChain)?;
        self.check_block(genesis, None)?;

        for pair in self.chain.windows(2) {
            self.check_block(&pair[1], Some(&pair[0]))?;
        }
        Ok(true)
    }

    /// Capture a deep copy of the chain.
    pub fn create_snapshot(&self) -> Snapshot {
        Snapshot {
            blocks: self.chain.clone(),
        }
    }

    /// Replace the chain wholesale with a snapshot's blocks.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        info!(
            from = self.chain.len(),
            to = snapshot.len(),
            "restoring chain from snapshot"
        );
        self.chain = snapshot.blocks;
        Ok(())
    }
}
