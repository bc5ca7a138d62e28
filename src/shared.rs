//! Thread-safe handle to a single ledger.
//!
//! Writers (`submit`, `mine`, `reset`) hold the write lock for the whole step,
//! so a submission racing a seal waits and then lands in the fresh pending
//! pool that follows the reward. Readers get owned snapshots.

use crate::blockchain::{Block, ChainFault, Ledger};
use crate::error::{RejectReason, Result};
use crate::miner::CancelFlag;
use crate::transaction::{Amount, Transaction};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn submit(&self, tx: Transaction) -> bool {
        self.inner.write().submit(tx)
    }

    pub fn try_submit(&self, tx: Transaction) -> std::result::Result<(), RejectReason> {
        self.inner.write().try_submit(tx)
    }

    pub fn submit_transfer(&self, sender: &str, recipient: &str, amount: Amount, description: &str) -> bool {
        self.inner
            .write()
            .submit_transfer(sender, recipient, amount, description)
    }

    pub fn mine(&self, sealer: &str) -> bool {
        self.inner.write().mine(sealer)
    }

    /// Seal and return a copy of the new block.
    pub fn try_mine(&self, sealer: &str) -> Result<Block> {
        self.inner.write().try_mine(sealer).cloned()
    }

    pub fn mine_cancellable(&self, sealer: &str, cancel: &CancelFlag) -> Result<Block> {
        self.inner.write().mine_cancellable(sealer, cancel).cloned()
    }

    pub fn validate(&self) -> bool {
        self.inner.read().validate()
    }

    pub fn verify(&self) -> std::result::Result<(), ChainFault> {
        self.inner.read().verify()
    }

    pub fn reset(&self) {
        self.inner.write().reset()
    }

    pub fn chain(&self) -> Vec<Block> {
        self.inner.read().chain().to_vec()
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.inner.read().pending().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` with shared access to the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn write<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.inner.write())
    }
}
