//! Proof-of-work sealing.
//!
//! The search walks nonces upward from the block's current nonce in fixed-size
//! batches. With more than one worker each batch is scanned on a rayon pool and
//! the lowest qualifying nonce of the batch wins, so a parallel seal lands on
//! exactly the nonce a sequential scan would have found.

use crate::blockchain::core::chain::check_difficulty;
use crate::blockchain::Block;
use crate::crypto::has_leading_zeros;
use crate::error::{ChainError, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_BATCH_SIZE: u64 = 4096;

/// Shared flag used to stop an in-progress seal from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Once raised the flag stays set.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealOptions {
    /// Threads scanning each batch; 1 keeps the search on the calling thread.
    pub workers: usize,
    /// Nonces examined between cancellation checks.
    pub batch_size: u64,
}

impl Default for SealOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealStats {
    pub nonce: u64,
    /// Nonces from the starting nonce up to and including the winner.
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Sequential seal with default options.
pub fn seal(block: &mut Block, difficulty: u32) -> Result<SealStats> {
    seal_with(block, difficulty, &SealOptions::default(), None)
}

/// One-off seal. Starts and drops its own workers; long-lived callers keep a
/// [`Sealer`] instead.
pub fn seal_with(
    block: &mut Block,
    difficulty: u32,
    options: &SealOptions,
    cancel: Option<&CancelFlag>,
) -> Result<SealStats> {
    Sealer::new(options.clone())?.seal(block, difficulty, cancel)
}

/// Sealing options together with the worker pool they call for. The pool is
/// started once and shared by clones.
#[derive(Debug, Clone, Default)]
pub struct Sealer {
    options: SealOptions,
    pool: Option<Arc<ThreadPool>>,
}

impl Sealer {
    pub fn new(options: SealOptions) -> Result<Self> {
        if options.workers == 0 || options.batch_size == 0 {
            return Err(ChainError::InvalidConfig(
                "workers and batch_size must be positive".to_string(),
            ));
        }
        let pool = if options.workers > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(options.workers)
                .thread_name(|i| format!("beatchain-seal-{}", i))
                .build()
                .map_err(|e| ChainError::InvalidConfig(format!("Failed to start seal workers: {}", e)))?;
            debug!("Started {} seal workers", options.workers);
            Some(Arc::new(pool))
        } else {
            None
        };
        Ok(Self { options, pool })
    }

    pub fn options(&self) -> &SealOptions {
        &self.options
    }

    /// Search for a nonce whose block hash starts with `difficulty` zeros and
    /// store it together with the hash.
    ///
    /// On error (bad difficulty, cancellation) the block is left as it was.
    pub fn seal(&self, block: &mut Block, difficulty: u32, cancel: Option<&CancelFlag>) -> Result<SealStats> {
        check_difficulty(difficulty)?;

        let start = Instant::now();
        let first = block.nonce();
        let prefix = Sha256::new().chain_update(block.preimage_prefix().as_bytes());
        let candidate = |nonce: u64| -> Option<String> {
            let hash = hex::encode(prefix.clone().chain_update(nonce.to_string().as_bytes()).finalize());
            has_leading_zeros(&hash, difficulty).then_some(hash)
        };

        let mut base = first;
        loop {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                trace!("Seal of block {} cancelled at nonce {}", block.index(), base);
                return Err(ChainError::Cancelled);
            }

            let end = base.saturating_add(self.options.batch_size);
            let found = match &self.pool {
                Some(pool) => pool.install(|| {
                    (base..end)
                        .into_par_iter()
                        .map(|nonce| candidate(nonce).map(|hash| (nonce, hash)))
                        .find_first(Option::is_some)
                        .flatten()
                }),
                None => (base..end).find_map(|nonce| candidate(nonce).map(|hash| (nonce, hash))),
            };

            if let Some((nonce, hash)) = found {
                block.set_proof(nonce, hash);
                return Ok(SealStats {
                    nonce,
                    attempts: nonce - first + 1,
                    elapsed: start.elapsed(),
                });
            }

            trace!("Block {}: no proof below nonce {}", block.index(), end);
            if end == u64::MAX {
                return Err(ChainError::InvalidConfig(format!(
                    "nonce space exhausted for block {}",
                    block.index()
                )));
            }
            base = end;
        }
    }
}
