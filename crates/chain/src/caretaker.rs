//! Undo history for a ledger.

use crate::ledger::{Ledger, LedgerError, Result, Snapshot};
use tracing::debug;

/// A stack of ledger snapshots. Each restore pops one state; there is no redo.
#[derive(Debug, Default)]
pub struct Caretaker {
    states: Vec<Snapshot>,
}

impl Caretaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a snapshot of the ledger's current chain.
    pub fn save_state(&mut self, ledger: &Ledger) {
        self.states.push(ledger.create_snapshot());
        debug!(depth = self.states.len(), "state saved");
    }

    /// Pop the most recent snapshot and apply it to the ledger.
    pub fn restore(&mut self, ledger: &mut Ledger) -> Result<()> {
        let snapshot = self.states.pop().ok_or(LedgerError::NoSavedState)?;
        ledger.restore(snapshot)?;
        debug!(depth = self.states.len(), "state restored");
        Ok(())
    }

    /// Drop the most recent snapshot without applying it.
    pub fn discard_latest(&mut self) -> Option<Snapshot> {
        self.states.pop()
    }

    /// Number of saved states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
