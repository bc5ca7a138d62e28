/// Transaction types for BeatChain
use crate::crypto::sha256_hex_parts;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Value carried by a transaction, in BEAT.
pub type Amount = f64;

/// Reserved sender for ledger-issued records (genesis and sealing rewards).
pub const SYSTEM_SENDER: &str = "System";

/// Reserved recipient of the genesis record.
pub const GENESIS_RECIPIENT: &str = "Genesis";

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Current wall-clock time as Unix nanoseconds.
///
/// Strictly increasing within the process: a call that lands on the same
/// clock reading as the previous one is bumped by a nanosecond, so records
/// built back to back never share a timestamp.
pub fn now_nanos() -> u64 {
    let wall = chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0);
    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(wall.max(last.saturating_add(1))))
        .unwrap_or_else(|last| last);
    wall.max(previous.saturating_add(1))
}

/// A value transfer between two named parties.
///
/// The `id` is derived once at construction and never recomputed, even on the
/// integrity-test path that rewrites fields of a sealed record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    sender: String,
    recipient: String,
    amount: Amount,
    #[serde(default)]
    description: String,
    created_at: u64,
    id: String,
}

impl Transaction {
    /// Build a transaction stamped with the current time.
    ///
    /// No validation happens here; the ledger checks admissibility on submit.
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(sender, recipient, amount, description, now_nanos())
    }

    /// Build a transaction at a fixed instant.
    pub fn with_timestamp(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
        created_at: u64,
    ) -> Self {
        let mut tx = Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            description: description.into(),
            created_at,
            id: String::new(),
        };
        tx.id = tx.compute_id();
        tx
    }

    /// Reward credited to whoever sealed a block.
    pub fn reward(recipient: impl Into<String>, amount: Amount) -> Self {
        Self::new(SYSTEM_SENDER, recipient, amount, "")
    }

    /// The synthetic record carried by every genesis block.
    pub fn genesis() -> Self {
        Self::new(SYSTEM_SENDER, GENESIS_RECIPIENT, 0.0, "")
    }

    /// Digest of the current field values. Equal to `id()` unless the record
    /// was rewritten after construction.
    pub fn compute_id(&self) -> String {
        sha256_hex_parts([
            self.sender.as_str(),
            self.recipient.as_str(),
            &self.amount.to_string(),
            self.description.as_str(),
            &self.created_at.to_string(),
        ])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }

    pub(crate) fn overwrite_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn overwrite_amount(&mut self, amount: Amount) {
        self.amount = amount;
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} → {}: {} BEAT | {}",
            self.sender, self.recipient, self.amount, self.description
        )
    }
}
