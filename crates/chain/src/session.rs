//! Presentation façade over a ledger, its miner and its undo history.
//!
//! Every mutating call saves a snapshot first so it can be undone. A call that
//! fails is rolled back on the spot, leaving neither a partial mutation nor a
//! stray undo entry behind.

use crate::caretaker::Caretaker;
use crate::config::LedgerConfig;
use crate::ledger::{Ledger, Result};
use crate::miner::Miner;
use serde::Serialize;
use tinyledger_consensus::MiningStrategy;
use tinyledger_core::{Digest, Transaction};
use tracing::{info, warn};

/// One row of the block table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRow {
    pub id: u64,
    pub digest: Digest,
    pub previous_digest: Digest,
    pub nonce: u64,
    pub tx_count: usize,
}

/// One row of the transaction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub block_id: u64,
    pub digest: Digest,
    pub payload: String,
}

/// Builds the mining strategy for each fresh ledger the session starts.
pub type StrategyFactory = fn(&LedgerConfig) -> Box<dyn MiningStrategy>;

fn proof_of_work(config: &LedgerConfig) -> Box<dyn MiningStrategy> {
    Box::new(config.proof_of_work())
}

/// A ledger driven by a single front-end.
#[derive(Debug)]
pub struct LedgerSession {
    config: LedgerConfig,
    strategy: StrategyFactory,
    ledger: Ledger,
    caretaker: Caretaker,
    miner: Miner,
}

impl LedgerSession {
    /// Start a session on a fresh proof-of-work ledger with a mined genesis.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        Self::with_strategy(config, proof_of_work)
    }

    /// Start a session whose ledgers mine with the strategy `factory` builds.
    pub fn with_strategy(config: LedgerConfig, factory: StrategyFactory) -> Result<Self> {
        let (ledger, miner) = Self::fresh(&config, factory)?;
        Ok(Self {
            config,
            strategy: factory,
            ledger,
            caretaker: Caretaker::new(),
            miner,
        })
    }

    fn fresh(config: &LedgerConfig, factory: StrategyFactory) -> Result<(Ledger, Miner)> {
        let mut ledger = Ledger::new(config.clone(), factory(config))?;
        let miner = Miner::new(config)?;
        if !ledger.is_mined(0)? {
            miner.mine_block(&mut ledger, 0)?;
        }
        Ok((ledger, miner))
    }

    /// Discard everything and start over from a new genesis block.
    pub fn reset(&mut self) -> Result<()> {
        let (ledger, miner) = Self::fresh(&self.config, self.strategy)?;
        self.ledger = ledger;
        self.miner = miner;
        self.caretaker.clear();
        info!("session reset");
        Ok(())
    }

    fn revocable<T>(&mut self, op: impl FnOnce(&mut Ledger, &mut Miner) -> Result<T>) -> Result<T> {
        self.caretaker.save_state(&self.ledger);
        let pool = self.miner.clone();

        match op(&mut self.ledger, &mut self.miner) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, "operation failed, rolling back");
                self.miner = pool;
                self.caretaker.restore(&mut self.ledger)?;
                Err(err)
            }
        }
    }

    /// Add a transaction straight to the ledger.
    pub fn submit_direct(&mut self, value: &str) -> Result<()> {
        let tx = Transaction::minimal(value);
        self.revocable(|ledger, _| ledger.add_transaction(tx))
    }

    /// Add a transaction through the miner's pool.
    ///
    /// Returns `true` if this submission filled the pool and flushed it into
    /// a new block.
    pub fn submit_pooled(&mut self, value: &str) -> Result<bool> {
        let tx = Transaction::minimal(value);
        self.revocable(|ledger, miner| miner.mine(ledger, tx))
    }

    /// Mine the block with the given id.
    pub fn mine_block(&mut self, id: u64) -> Result<()> {
        self.revocable(|ledger, miner| miner.mine_block(ledger, id))
    }

    /// Validate the whole chain, describing the first failure.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.ledger
            .validate_chain()
            .map(|_| ())
            .map_err(|err| err.to_string())
    }

    /// Undo the most recent mutating call.
    pub fn undo(&mut self) -> Result<()> {
        self.caretaker.restore(&mut self.ledger)
    }

    pub fn block_rows(&self) -> Vec<BlockRow> {
        self.ledger
            .blocks()
            .iter()
            .map(|block| BlockRow {
                id: block.id(),
                digest: block.digest().clone(),
                previous_digest: block.previous_digest().clone(),
                nonce: block.nonce(),
                tx_count: block.tx_count(),
            })
            .collect()
    }

    pub fn transaction_rows(&self) -> Vec<TransactionRow> {
        self.ledger
            .blocks()
            .iter()
            .flat_map(|block| {
                block.transactions().iter().map(move |tx| TransactionRow {
                    block_id: block.id(),
                    digest: tx.digest().clone(),
                    payload: tx.payload().to_string(),
                })
            })
            .collect()
    }

    /// The chain as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        self.ledger.to_json()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn chain_len(&self) -> usize {
        self.ledger.len()
    }

    pub fn pool_size(&self) -> usize {
        self.miner.pool_size()
    }

    pub fn block_threshold(&self) -> usize {
        self.config.block_threshold
    }

    /// Number of calls that can currently be undone.
    pub fn undo_depth(&self) -> usize {
        self.caretaker.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tinyledger_consensus::MiningError;
    use tinyledger_core::Block;

    /// Counts a digest as mined only once this strategy has sealed it.
    #[derive(Debug, Default)]
    struct SealingStrategy {
        sealed: Mutex<HashSet<Digest>>,
    }

    impl MiningStrategy for SealingStrategy {
        fn mine(&self, block: &mut Block) -> std::result::Result<(), MiningError> {
            if !self.validate_hash(block.digest())? {
                block.increment_nonce();
                self.sealed.lock().unwrap().insert(block.digest().clone());
            }
            Ok(())
        }

        fn validate_hash(&self, digest: &Digest) -> std::result::Result<bool, MiningError> {
            Ok(self.sealed.lock().unwrap().contains(digest))
        }

        fn name(&self) -> String {
            "sealing".to_string()
        }
    }

    fn sealing_strategy(_: &LedgerConfig) -> Box<dyn MiningStrategy> {
        Box::new(SealingStrategy::default())
    }

    fn session() -> LedgerSession {
        LedgerSession::new(LedgerConfig::new(3, 1)).unwrap()
    }

    #[test]
    fn test_new_session_is_valid() {
        let session = session();
        assert_eq!(session.chain_len(), 1);
        assert_eq!(session.validate(), Ok(()));
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn test_pooled_submission_reports_flush() {
        let mut session = session();

        assert!(!session.submit_pooled("a").unwrap());
        assert!(!session.submit_pooled("b").unwrap());
        assert!(session.submit_pooled("c").unwrap());

        assert_eq!(session.pool_size(), 0);
        assert_eq!(session.chain_len(), 2);
        assert_eq!(session.validate(), Ok(()));
    }

    #[test]
    fn test_undo_each_call() {
        let mut session = session();
        session.submit_pooled("a").unwrap();
        session.submit_pooled("b").unwrap();
        session.submit_pooled("c").unwrap();
        assert_eq!(session.undo_depth(), 3);

        session.undo().unwrap();
        assert_eq!(session.chain_len(), 1);
        session.undo().unwrap();
        session.undo().unwrap();
        assert!(matches!(session.undo(), Err(LedgerError::NoSavedState)));
    }

    #[test]
    fn test_failed_call_rolls_back() {
        let mut session = session();
        let rows = session.block_rows();

        let err = session.mine_block(0).unwrap_err();

        assert!(matches!(err, LedgerError::AlreadyMined(0)));
        assert_eq!(session.block_rows(), rows);
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn test_unmined_direct_block_then_mine() {
        let mut session =
            LedgerSession::with_strategy(LedgerConfig::new(5, 0), sealing_strategy).unwrap();
        session.submit_direct("direct").unwrap();

        assert_eq!(session.chain_len(), 2);
        assert!(!session.ledger().is_mined(1).unwrap());
        assert!(session.validate().unwrap_err().contains("block 1: block is not mined"));

        session.mine_block(1).unwrap();

        assert_eq!(session.validate(), Ok(()));
        assert!(matches!(session.mine_block(1), Err(LedgerError::AlreadyMined(1))));
    }

    #[test]
    fn test_reset_keeps_strategy() {
        let mut session =
            LedgerSession::with_strategy(LedgerConfig::new(5, 0), sealing_strategy).unwrap();
        session.reset().unwrap();
        assert_eq!(session.ledger().strategy().name(), "sealing");
    }

    #[test]
    fn test_tables() {
        let mut session = LedgerSession::new(LedgerConfig::new(2, 0)).unwrap();
        session.submit_direct("x").unwrap();

        let blocks = session.block_rows();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].previous_digest, blocks[0].digest);

        let txs = session.transaction_rows();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].payload, "GENESIS");
        assert_eq!(txs[1].block_id, 1);
        assert_eq!(txs[1].payload, "x");
    }

    #[test]
    fn test_reset() {
        let mut session = session();
        session.submit_direct("x").unwrap();
        session.submit_pooled("y").unwrap();

        session.reset().unwrap();

        assert_eq!(session.chain_len(), 1);
        assert_eq!(session.pool_size(), 0);
        assert_eq!(session.undo_depth(), 0);
    }
}
