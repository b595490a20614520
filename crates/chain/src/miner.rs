//! Transaction-pooling miner.
//!
//! Pooled transactions only reach the chain in batches: once the pool holds
//! `threshold` transactions they are written into a new block, which is then
//! mined with the ledger's strategy.

use crate::config::LedgerConfig;
use crate::ledger::{Ledger, LedgerError, Result};
use tinyledger_core::{BlockBuilder, BlockError, Transaction};
use tracing::{debug, info};

/// Batches transactions into freshly mined blocks.
#[derive(Debug, Clone)]
pub struct Miner {
    /// Pending transactions in submission order.
    pool: Vec<Transaction>,
    /// Pool size that triggers a flush.
    threshold: usize,
}

impl Miner {
    /// Create a miner whose pool flushes at the ledger's block threshold.
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pool: Vec::with_capacity(config.block_threshold),
            threshold: config.block_threshold,
        })
    }

    /// Number of pending transactions.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pool
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Pool a transaction, flushing the pool into a mined block once it is
    /// full.
    ///
    /// Returns `true` when this submission triggered a flush. If the flush
    /// fails, neither the chain nor the pool keeps any trace of the call.
    pub fn mine(&mut self, ledger: &mut Ledger, tx: Transaction) -> Result<bool> {
        if !tx.verify_digest() {
            return Err(BlockError::InvalidTransaction {
                digest: tx.digest().clone(),
            }
            .into());
        }

        self.pool.push(tx);
        debug!(pool = self.pool.len(), threshold = self.threshold, "transaction pooled");

        if self.pool.len() < self.threshold {
            return Ok(false);
        }

        if let Err(err) = self.flush(ledger) {
            self.pool.pop();
            return Err(err);
        }
        Ok(true)
    }

    /// Fill and mine a detached block, then append it. Nothing reaches the
    /// chain unless mining succeeded.
    fn flush(&mut self, ledger: &mut Ledger) -> Result<()> {
        let id = ledger.len() as u64;
        let mut block = BlockBuilder::new(id)
            .previous_digest(ledger.last_block()?.digest().clone())
            .build();

        for tx in &self.pool {
            block.add_transaction(tx.clone())?;
        }
        ledger.strategy().mine(&mut block)?;

        info!(
            block = id,
            transactions = self.pool.len(),
            digest = %block.digest(),
            "pool flushed into mined block"
        );
        ledger.add_block(block)?;
        self.pool.clear();
        Ok(())
    }

    /// Mine the block with the given id in place.
    ///
    /// Fails with [`LedgerError::AlreadyMined`] if its digest is already
    /// valid. Mining a block that has successors changes its digest and
    /// breaks their linkage; chain validation reports it.
    pub fn mine_block(&self, ledger: &mut Ledger, id: u64) -> Result<()> {
        let (block, strategy) = ledger.block_with_strategy(id)?;

        if strategy.validate_hash(block.digest())? {
            return Err(LedgerError::AlreadyMined(id));
        }
        strategy.mine(block)?;

        info!(block = id, nonce = block.nonce(), digest = %block.digest(), "block mined");
        Ok(())
    }
}
