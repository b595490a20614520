//! Ledger orchestration for tinyledger.
//!
//! This crate brings the core types and a mining strategy together:
//! - **Ledger**: the chain of blocks, its linkage rules and validation
//! - **Miner**: a transaction pool flushed into freshly mined blocks
//! - **Caretaker**: an undo stack of chain snapshots
//! - **Session**: the façade a front-end drives
//!
//! # Example
//!
//! ```rust
//! use tinyledger_chain::{Caretaker, Ledger, LedgerConfig, Miner};
//! use tinyledger_consensus::ProofOfWork;
//! use tinyledger_core::Transaction;
//!
//! let config = LedgerConfig::new(5, 1);
//! let mut ledger = Ledger::new(config.clone(), Box::new(ProofOfWork::new(1))).unwrap();
//! let mut miner = Miner::new(&config).unwrap();
//! let mut caretaker = Caretaker::new();
//!
//! // The genesis block is left for the caller to mine
//! if !ledger.is_mined(0).unwrap() {
//!     miner.mine_block(&mut ledger, 0).unwrap();
//! }
//!
//! caretaker.save_state(&ledger);
//! for i in 0..5 {
//!     miner.mine(&mut ledger, Transaction::minimal(format!("tx-{i}"))).unwrap();
//! }
//! assert_eq!(ledger.len(), 2);
//! assert!(ledger.validate_chain().unwrap());
//!
//! caretaker.restore(&mut ledger).unwrap();
//! assert_eq!(ledger.len(), 1);
//! ```

pub mod caretaker;
pub mod config;
pub mod ledger;
pub mod miner;
pub mod session;

// Re-export commonly used types
pub use caretaker::Caretaker;
pub use config::LedgerConfig;
pub use ledger::{IntegrityViolation, Ledger, LedgerError, Result, Snapshot, GENESIS_PAYLOAD};
pub use miner::Miner;
pub use session::{BlockRow, LedgerSession, StrategyFactory, TransactionRow};
