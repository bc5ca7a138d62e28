// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block and ledger management, chain validation and the tamper path.

pub mod core;
pub use self::core::*;
