/// Admission rules for the pending pool, kept apart from the type definitions
use crate::error::RejectReason;
use crate::transaction::types::Transaction;

/// Decide whether `tx` may enter a ledger's pending pool.
///
/// A NaN amount fails the `> 0` comparison and is rejected like any other
/// non-positive amount.
pub fn check_admissible(tx: &Transaction) -> Result<(), RejectReason> {
    if tx.sender().is_empty() {
        return Err(RejectReason::InvalidSender);
    }
    if tx.recipient().is_empty() {
        return Err(RejectReason::InvalidRecipient);
    }
    if tx.amount().is_nan() || tx.amount() <= 0.0 {
        return Err(RejectReason::NonPositiveAmount);
    }
    Ok(())
}

impl Transaction {
    pub fn is_admissible(&self) -> bool {
        check_admissible(self).is_ok()
    }
}
