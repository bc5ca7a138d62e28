use crate::config::{Config, LedgerConfig};
use crate::crypto::{has_leading_zeros, sha256_hex, HEX_DIGEST_LEN};
use crate::error::{ChainError, RejectReason, Result};
use crate::miner::{CancelFlag, SealOptions, Sealer};
use crate::transaction::{check_admissible, now_nanos, Amount, Transaction};
use tracing::{debug, info};

use super::validation::{verify_chain, ChainFault};

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

pub const DEFAULT_DIFFICULTY: u32 = 3;
pub const DEFAULT_REWARD: Amount = 50.0;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    index: u64,
    created_at: u64,
    transactions: Vec<Transaction>,
    previous_hash: String,
    nonce: u64,
    hash: String,
}

impl Block {
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: impl Into<String>) -> Self {
        Self::with_timestamp(index, now_nanos(), transactions, previous_hash)
    }

    pub fn with_timestamp(
        index: u64,
        created_at: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Block {
            index,
            created_at,
            transactions,
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Index 0, one `System → Genesis` record, never sealed.
    pub fn genesis() -> Self {
        Self::new(0, vec![Transaction::genesis()], GENESIS_PREVIOUS_HASH)
    }

    /// Digest of the current field values with the current nonce.
    pub fn calculate_hash(&self) -> String {
        self.hash_with_nonce(self.nonce)
    }

    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        let mut preimage = self.preimage_prefix();
        preimage.push_str(&nonce.to_string());
        sha256_hex(&preimage)
    }

    /// Everything the block hash covers except the nonce, in hashing order.
    pub(crate) fn preimage_prefix(&self) -> String {
        let mut preimage = format!("{}{}", self.index, self.created_at);
        for tx in &self.transactions {
            preimage.push_str(&tx.to_string());
        }
        preimage.push_str(&self.previous_hash);
        preimage
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        has_leading_zeros(&self.hash, difficulty)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    pub(crate) fn set_proof(&mut self, nonce: u64, hash: String) {
        self.nonce = nonce;
        self.hash = hash;
    }

    pub(crate) fn transaction_mut(&mut self, index: usize) -> Option<&mut Transaction> {
        self.transactions.get_mut(index)
    }

    pub(crate) fn overwrite_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

/// Single-node chain of sealed blocks plus the pool awaiting the next seal.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: u32,
    reward: Amount,
    sealer: Sealer,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Ledger with difficulty 3 and reward 50.
    pub fn new() -> Self {
        Ledger {
            blocks: vec![Block::genesis()],
            pending: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY,
            reward: DEFAULT_REWARD,
            sealer: Sealer::default(),
        }
    }

    pub fn with_config(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Ledger {
            difficulty: config.difficulty,
            reward: config.reward,
            ..Self::new()
        })
    }

    /// Ledger settings plus the miner's sealing options.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::with_config(&config.ledger)?.with_seal_options(SealOptions::from(&config.miner))
    }

    /// Starts the seal workers once; every later `mine` reuses them.
    pub fn with_seal_options(mut self, seal_options: SealOptions) -> Result<Self> {
        self.sealer = Sealer::new(seal_options)?;
        Ok(self)
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn latest_block(&self) -> &Block {
        // The chain always holds at least the genesis block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn reward(&self) -> Amount {
        self.reward
    }

    pub fn seal_options(&self) -> &SealOptions {
        self.sealer.options()
    }

    /// Admit `tx` to the end of the pending pool, or say why not.
    pub fn try_submit(&mut self, tx: Transaction) -> std::result::Result<(), RejectReason> {
        if let Err(reason) = check_admissible(&tx) {
            debug!("Rejected transaction {}: {}", tx.id(), reason);
            return Err(reason);
        }
        debug!("Admitted transaction {} ({})", tx.id(), tx);
        self.pending.push(tx);
        Ok(())
    }

    pub fn submit(&mut self, tx: Transaction) -> bool {
        self.try_submit(tx).is_ok()
    }

    pub fn submit_transfer(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Amount,
        description: &str,
    ) -> bool {
        self.submit(Transaction::new(sender, recipient, amount, description))
    }

    /// Seal the pending pool into a new block and queue the sealer's reward.
    ///
    /// `sealer` is not checked; an empty name yields a reward to `""`.
    pub fn try_mine(&mut self, sealer: &str) -> Result<&Block> {
        self.mine_inner(sealer, None)
    }

    pub fn mine(&mut self, sealer: &str) -> bool {
        self.try_mine(sealer).is_ok()
    }

    /// As [`Ledger::try_mine`], but stops when `cancel` is raised. A cancelled
    /// seal leaves the chain and the pending pool as they were.
    pub fn mine_cancellable(&mut self, sealer: &str, cancel: &CancelFlag) -> Result<&Block> {
        self.mine_inner(sealer, Some(cancel))
    }

    fn mine_inner(&mut self, sealer: &str, cancel: Option<&CancelFlag>) -> Result<&Block> {
        if self.pending.is_empty() {
            return Err(ChainError::EmptyPending);
        }

        let mut block = Block::new(
            self.blocks.len() as u64,
            self.pending.clone(),
            self.latest_block().hash().to_string(),
        );
        let stats = self.sealer.seal(&mut block, self.difficulty, cancel)?;

        info!(
            "Sealed block {} with {} transactions (nonce {}, {} attempts, {:.3}s): {}",
            block.index(),
            block.transactions().len(),
            stats.nonce,
            stats.attempts,
            stats.elapsed.as_secs_f64(),
            block.hash()
        );

        self.blocks.push(block);
        self.pending = vec![Transaction::reward(sealer, self.reward)];
        Ok(self.latest_block())
    }

    /// Hash continuity and hash/content agreement for blocks 1..end.
    pub fn verify(&self) -> std::result::Result<(), ChainFault> {
        verify_chain(&self.blocks, None)
    }

    /// [`Ledger::verify`] plus proof-of-work on every non-genesis block.
    pub fn verify_strict(&self) -> std::result::Result<(), ChainFault> {
        verify_chain(&self.blocks, Some(self.difficulty))
    }

    pub fn validate(&self) -> bool {
        self.verify().is_ok()
    }

    pub fn validate_strict(&self) -> bool {
        self.verify_strict().is_ok()
    }

    /// Back to a lone fresh genesis block and an empty pool.
    pub fn reset(&mut self) {
        info!("Resetting ledger ({} blocks discarded)", self.blocks.len());
        self.blocks = vec![Block::genesis()];
        self.pending.clear();
    }

    pub(crate) fn block_mut(&mut self, index: u64) -> Option<&mut Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get_mut(i))
    }
}

/// Reject difficulties no hex digest can meet.
pub(crate) fn check_difficulty(difficulty: u32) -> Result<()> {
    if difficulty == 0 || difficulty as usize > HEX_DIGEST_LEN {
        return Err(ChainError::InvalidConfig(format!(
            "difficulty must be between 1 and {}, got {}",
            HEX_DIGEST_LEN, difficulty
        )));
    }
    Ok(())
}
