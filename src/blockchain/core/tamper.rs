//! Deliberate integrity violations, used to show that validation notices
//! edits to sealed blocks. Nothing on the normal path goes through here.

use super::chain::{Block, Ledger};
use crate::error::{ChainError, Result};
use crate::transaction::{Amount, Transaction};
use tracing::warn;

/// Mutable view of one sealed block.
pub struct Tamper<'a> {
    block: &'a mut Block,
}

impl Ledger {
    pub fn tamper(&mut self, index: u64) -> Result<Tamper<'_>> {
        let block = self.block_mut(index).ok_or(ChainError::UnknownBlock(index))?;
        Ok(Tamper { block })
    }
}

impl Tamper<'_> {
    pub fn block(&self) -> &Block {
        &*self.block
    }

    /// Rewrite a transaction's description, leaving its id and the block hash alone.
    pub fn set_description(&mut self, tx: usize, description: impl Into<String>) -> Result<&mut Self> {
        let description = description.into();
        warn!(
            "Tampering with block {} transaction {}: description -> {:?}",
            self.block.index(),
            tx,
            description
        );
        self.transaction(tx)?.overwrite_description(description);
        Ok(self)
    }

    pub fn set_amount(&mut self, tx: usize, amount: Amount) -> Result<&mut Self> {
        warn!(
            "Tampering with block {} transaction {}: amount -> {}",
            self.block.index(),
            tx,
            amount
        );
        self.transaction(tx)?.overwrite_amount(amount);
        Ok(self)
    }

    /// Overwrite the stored hash with one recomputed from the current contents,
    /// without searching for a new nonce. Successors are not relinked.
    pub fn rehash(&mut self) -> &str {
        let hash = self.block.calculate_hash();
        self.block.overwrite_hash(hash);
        self.block.hash()
    }

    fn transaction(&mut self, tx: usize) -> Result<&mut Transaction> {
        let block = self.block.index();
        self.block
            .transaction_mut(tx)
            .ok_or(ChainError::UnknownTransaction { block, index: tx })
    }
}
