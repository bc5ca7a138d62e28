use super::chain::Block;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// Stored hash no longer matches the block's contents.
    HashMismatch { stored: String, computed: String },
    /// `previous_hash` differs from the predecessor's stored hash.
    BrokenLink { expected: String, found: String },
    /// Stored hash lacks the required leading zeros (strict checks only).
    InsufficientWork { difficulty: u32 },
}

/// First inconsistency found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("block {index}: {}", describe(.kind))]
pub struct ChainFault {
    pub index: u64,
    pub kind: FaultKind,
}

fn describe(kind: &FaultKind) -> String {
    match kind {
        FaultKind::HashMismatch { stored, computed } => {
            format!("stored hash {} does not match contents ({})", stored, computed)
        }
        FaultKind::BrokenLink { expected, found } => {
            format!("previous hash {} does not match predecessor {}", found, expected)
        }
        FaultKind::InsufficientWork { difficulty } => {
            format!("hash does not have {} leading zeros", difficulty)
        }
    }
}

/// Walk blocks 1..end checking hash/content agreement then linkage.
///
/// The genesis block is never examined. Proof-of-work is only re-checked when
/// `strict_difficulty` is given.
pub fn verify_chain(blocks: &[Block], strict_difficulty: Option<u32>) -> Result<(), ChainFault> {
    for pair in blocks.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);

        let computed = current.calculate_hash();
        if current.hash() != computed {
            return Err(fault(
                current,
                FaultKind::HashMismatch {
                    stored: current.hash().to_string(),
                    computed,
                },
            ));
        }

        if current.previous_hash() != previous.hash() {
            return Err(fault(
                current,
                FaultKind::BrokenLink {
                    expected: previous.hash().to_string(),
                    found: current.previous_hash().to_string(),
                },
            ));
        }

        if let Some(difficulty) = strict_difficulty {
            if !current.meets_difficulty(difficulty) {
                return Err(fault(current, FaultKind::InsufficientWork { difficulty }));
            }
        }
    }
    Ok(())
}

fn fault(block: &Block, kind: FaultKind) -> ChainFault {
    let fault = ChainFault { index: block.index(), kind };
    warn!("Chain validation failed: {}", fault);
    fault
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn linked_pair() -> Vec<Block> {
        let genesis = Block::with_timestamp(0, 1, vec![Transaction::genesis()], "0");
        let next = Block::with_timestamp(
            1,
            2,
            vec![Transaction::with_timestamp("a", "b", 1.0, "", 2)],
            genesis.hash(),
        );
        vec![genesis, next]
    }

    #[test]
    fn test_lone_genesis_is_valid() {
        assert!(verify_chain(&[Block::genesis()], None).is_ok());
        assert!(verify_chain(&[], None).is_ok());
    }

    #[test]
    fn test_unsealed_linked_blocks_pass_loose_check_only() {
        let blocks = linked_pair();
        assert!(verify_chain(&blocks, None).is_ok());

        // An unsealed hash almost never starts with 16 zeros
        let err = verify_chain(&blocks, Some(16)).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, FaultKind::InsufficientWork { difficulty: 16 });
    }

    #[test]
    fn test_broken_link_reported() {
        let mut blocks = linked_pair();
        blocks[0] = Block::with_timestamp(0, 99, vec![Transaction::genesis()], "0");
        let err = verify_chain(&blocks, None).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.kind, FaultKind::BrokenLink { .. }));
        assert!(err.to_string().starts_with("block 1: previous hash"));
    }

    #[test]
    fn test_genesis_contents_not_rechecked() {
        let mut blocks = linked_pair();
        let genesis_hash = blocks[0].hash().to_string();
        blocks[0]
            .transaction_mut(0)
            .unwrap()
            .overwrite_description("rewritten".to_string());
        assert_ne!(blocks[0].calculate_hash(), genesis_hash);
        assert!(verify_chain(&blocks, None).is_ok());
    }

    #[test]
    fn test_hash_mismatch_reported_before_link() {
        let mut blocks = linked_pair();
        blocks[1].overwrite_hash("f".repeat(64));
        let err = verify_chain(&blocks, None).unwrap_err();
        assert!(matches!(err.kind, FaultKind::HashMismatch { .. }));
    }
}
