//! BeatChain - a minimal single-node append-only ledger sealed by proof-of-work
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, chain validation and the tamper path
//! - [`transaction`] - Transaction records and admission rules
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work sealing (sequential or parallel, cancellable)
//!
//! ## Cryptography
//! - [`crypto`] - SHA-256 digests and difficulty checks
//!
//! ## Concurrency
//! - [`shared`] - Lock-guarded ledger handle for multi-threaded callers
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - Session commands and rendering for the binary

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Concurrency
// ============================================================================
pub mod shared;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;

pub use blockchain::{Block, Ledger};
pub use error::{ChainError, RejectReason};
pub use shared::SharedLedger;
pub use transaction::Transaction;
