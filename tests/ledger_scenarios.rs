//! Integration tests for submitting, sealing and validating a ledger

use beatchain::blockchain::{FaultKind, Ledger};
use beatchain::config::{Config, LedgerConfig, MinerConfig};
use beatchain::miner::CancelFlag;
use beatchain::{ChainError, SharedLedger, Transaction};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Helper to build a ledger with a given difficulty and the default reward
fn ledger_with_difficulty(difficulty: u32) -> Result<Ledger, Box<dyn std::error::Error>> {
    Ok(Ledger::with_config(&LedgerConfig { difficulty, reward: 50.0 })?)
}

/// Helper to run a few submit/mine rounds
fn populated_ledger() -> Result<Ledger, Box<dyn std::error::Error>> {
    let mut ledger = ledger_with_difficulty(2)?;
    for (round, sealer) in ["alice", "bob", "carol"].iter().enumerate() {
        assert!(ledger.submit_transfer("alice", "bob", 1.0 + round as f64, "rent"));
        assert!(ledger.submit_transfer("bob", "carol", 0.5, ""));
        assert!(ledger.mine(sealer));
    }
    Ok(ledger)
}

#[test]
fn test_end_to_end_scenario() -> TestResult {
    let mut ledger = Ledger::new();
    assert_eq!(ledger.difficulty(), 3);
    assert_eq!(ledger.reward(), 50.0);

    assert!(ledger.submit(Transaction::new("alice", "bob", 10.0, "lunch")));
    assert!(ledger.mine("alice"));

    assert_eq!(ledger.chain().len(), 2);
    assert!(ledger.chain()[1].hash().starts_with("000"));

    assert_eq!(ledger.pending().len(), 1);
    let reward = &ledger.pending()[0];
    assert_eq!(reward.sender(), "System");
    assert_eq!(reward.recipient(), "alice");
    assert_eq!(reward.amount(), 50.0);

    assert!(ledger.validate());

    ledger.tamper(1)?.set_description(0, "free lunch")?;
    assert!(!ledger.validate());

    Ok(())
}

#[test]
fn test_chain_continuity_and_work() -> TestResult {
    let ledger = populated_ledger()?;
    assert_eq!(ledger.len(), 4);

    for (i, pair) in ledger.chain().windows(2).enumerate() {
        assert_eq!(pair[1].previous_hash(), pair[0].hash());
        assert_eq!(pair[1].index(), i as u64 + 1);
        assert!(pair[1].meets_difficulty(ledger.difficulty()));
        assert_eq!(pair[1].hash(), pair[1].calculate_hash());
    }
    assert!(ledger.validate());
    assert!(ledger.validate_strict());
    Ok(())
}

#[test]
fn test_reward_is_sealed_in_next_block() -> TestResult {
    let ledger = populated_ledger()?;
    // Block 2 starts with the reward queued after block 1
    let first = &ledger.chain()[2].transactions()[0];
    assert!(first.is_system());
    assert_eq!(first.recipient(), "alice");
    assert_eq!(ledger.chain()[2].transactions().len(), 3);
    Ok(())
}

#[test]
fn test_sealed_block_is_a_snapshot() -> TestResult {
    let mut ledger = ledger_with_difficulty(1)?;
    ledger.submit_transfer("alice", "bob", 1.0, "");
    ledger.mine("alice");
    ledger.submit_transfer("carol", "dave", 2.0, "");

    assert_eq!(ledger.chain()[1].transactions().len(), 1);
    assert_eq!(ledger.pending().len(), 2);
    assert!(ledger.validate());
    Ok(())
}

#[test]
fn test_tamper_without_rehash_is_a_hash_mismatch() -> TestResult {
    let mut ledger = populated_ledger()?;
    ledger.tamper(2)?.set_description(1, "forged")?;

    let fault = ledger.verify().unwrap_err();
    assert_eq!(fault.index, 2);
    assert!(matches!(fault.kind, FaultKind::HashMismatch { .. }));
    assert!(!ledger.validate());
    Ok(())
}

#[test]
fn test_rehashed_tamper_breaks_the_next_link() -> TestResult {
    let mut ledger = populated_ledger()?;
    {
        let mut handle = ledger.tamper(1)?;
        handle.set_amount(0, 1_000_000.0)?;
        handle.rehash();
    }

    let fault = ledger.verify().unwrap_err();
    assert_eq!(fault.index, 2);
    assert!(matches!(fault.kind, FaultKind::BrokenLink { .. }));
    assert!(!ledger.validate());
    Ok(())
}

#[test]
fn test_rehashed_tip_escapes_loose_validation() -> TestResult {
    let mut ledger = populated_ledger()?;
    let tip = ledger.latest_block().index();
    {
        let mut handle = ledger.tamper(tip)?;
        handle.set_description(0, "rewritten")?;
        handle.rehash();
    }

    // Nothing follows the tip, so only the work check can notice
    assert!(ledger.validate());
    let hash = ledger.latest_block().hash().to_string();
    if !hash.starts_with("00") {
        let fault = ledger.verify_strict().unwrap_err();
        assert_eq!(fault.kind, FaultKind::InsufficientWork { difficulty: 2 });
    }
    Ok(())
}

#[test]
fn test_genesis_edits_are_not_checked() -> TestResult {
    let mut ledger = Ledger::new();
    ledger.tamper(0)?.set_description(0, "rewritten genesis")?;
    assert!(ledger.validate());
    Ok(())
}

#[test]
fn test_empty_pool_mining_is_noop() -> TestResult {
    let mut ledger = Ledger::new();
    assert!(!ledger.mine("alice"));
    assert_eq!(ledger.len(), 1);
    assert!(ledger.pending().is_empty());
    assert!(matches!(ledger.try_mine("alice"), Err(ChainError::EmptyPending)));
    Ok(())
}

#[test]
fn test_rejections_do_not_mutate() -> TestResult {
    let mut ledger = Ledger::new();
    assert!(!ledger.submit_transfer("", "bob", 5.0, ""));
    assert!(!ledger.submit_transfer("alice", "", 5.0, ""));
    assert!(!ledger.submit_transfer("alice", "bob", 0.0, ""));
    assert!(!ledger.submit_transfer("alice", "bob", -3.0, ""));

    let reason = ledger
        .try_submit(Transaction::new("alice", "bob", 0.0, ""))
        .unwrap_err();
    let err: ChainError = reason.into();
    assert_eq!(err.to_string(), "Transaction rejected: amount must be greater than zero");

    assert!(ledger.pending().is_empty());
    assert_eq!(ledger.len(), 1);
    Ok(())
}

#[test]
fn test_parallel_workers_produce_valid_chain() -> TestResult {
    let config = Config {
        ledger: LedgerConfig { difficulty: 3, reward: 25.0 },
        miner: MinerConfig { workers: 4, batch_size: 1024 },
    };
    let mut ledger = Ledger::from_config(&config)?;
    ledger.submit_transfer("alice", "bob", 3.0, "parallel");
    let block = ledger.try_mine("alice")?;
    assert!(block.hash().starts_with("000"));
    assert_eq!(ledger.pending()[0].amount(), 25.0);
    assert!(ledger.validate_strict());
    Ok(())
}

#[test]
fn test_cancelled_mine_through_shared_handle() -> TestResult {
    let shared = SharedLedger::new(ledger_with_difficulty(2)?);
    shared.submit_transfer("alice", "bob", 1.0, "");

    let cancel = CancelFlag::new();
    cancel.cancel();
    assert!(matches!(
        shared.mine_cancellable("alice", &cancel),
        Err(ChainError::Cancelled)
    ));
    assert_eq!(shared.len(), 1);
    assert_eq!(shared.pending().len(), 1);

    let block = shared.try_mine("alice")?;
    assert_eq!(block.index(), 1);
    assert!(shared.validate());
    Ok(())
}

#[test]
fn test_reset_discards_everything() -> TestResult {
    let mut ledger = populated_ledger()?;
    ledger.reset();
    assert_eq!(ledger.len(), 1);
    assert!(ledger.pending().is_empty());
    assert!(ledger.validate());
    assert!(ledger.chain()[0].is_genesis());
    assert_eq!(ledger.chain()[0].previous_hash(), "0");
    Ok(())
}
