//! Unit tests for AshBridge orchestration logic.
//!
//! These tests drive the "*_once" functions in tasks.rs directly, so the
//! epoch and ledger behavior is covered without tokio::spawn complexity.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::core::AshBridge;
use crate::cache::TieredCache;
use crate::config::BaseConfig;
use crate::durable::{DurableStoreVariant, MemoryDurableStore};
use crate::feed::{BurnFeedVariant, NoopBurnFeed};
use crate::gateway::{ClaimGatewayVariant, RootRegistryVariant, SimulatedChain};
use crate::proofs::{LookupResult, MatchPolicy, ProofStore};
use crate::redemption::BurnLedger;
use crate::traits::{DurableStore, RootRegistry};
use crate::types::ObservedBurn;

// ==================== TEST HELPERS ====================

fn test_burn(addr_id: u8, token_ids: &[u64]) -> ObservedBurn {
    ObservedBurn {
        holder_address: format!("0x{:040x}", addr_id),
        token_ids: token_ids.to_vec(),
        source_tx_hash: format!("0x{:064x}", addr_id),
        block_number: 1000 + addr_id as u64,
    }
}

struct TestStack {
    durable: Arc<DurableStoreVariant>,
    ledger: Arc<BurnLedger>,
    proofs: Arc<ProofStore>,
    registry: Arc<RootRegistryVariant>,
    sim: SimulatedChain,
}

fn test_stack() -> TestStack {
    let durable = Arc::new(DurableStoreVariant::Memory(MemoryDurableStore::new()));
    let cache = Arc::new(TieredCache::new("test", Arc::clone(&durable)));
    let ledger = Arc::new(BurnLedger::new(Arc::clone(&durable)));
    let proofs = Arc::new(ProofStore::new(
        cache,
        MatchPolicy::default(),
        Duration::from_secs(3600),
    ));
    let sim = SimulatedChain::new();
    let registry = Arc::new(RootRegistryVariant::Sim(sim.clone()));
    TestStack {
        durable,
        ledger,
        proofs,
        registry,
        sim,
    }
}

fn test_bridge(durable: MemoryDurableStore) -> AshBridge {
    let sim = SimulatedChain::new();
    AshBridge::new(
        BurnFeedVariant::Noop(NoopBurnFeed),
        RootRegistryVariant::Sim(sim.clone()),
        ClaimGatewayVariant::Sim(sim),
        DurableStoreVariant::Memory(durable),
        BaseConfig::default(),
    )
}

// ==================== TESTS: observe_once ====================

#[tokio::test]
async fn test_observe_once_records_burn() -> Result<()> {
    let stack = test_stack();

    let burn = test_burn(1, &[3, 1, 2]);
    let record = AshBridge::observe_once(&stack.ledger, &burn).await?;

    assert_eq!(record.holder_address, burn.holder_address);
    assert_eq!(record.token_ids, vec![1, 2, 3], "ids stored sorted");
    assert!(!record.redeemed);
    assert_eq!(stack.ledger.len().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_observe_once_is_idempotent() -> Result<()> {
    let stack = test_stack();

    let burn = test_burn(1, &[1, 2, 3]);
    let first = AshBridge::observe_once(&stack.ledger, &burn).await?;

    // Same holder and tokens seen again, e.g. a feed replay
    let mut replay = burn.clone();
    replay.block_number += 5;
    let second = AshBridge::observe_once(&stack.ledger, &replay).await?;

    assert_eq!(first.timestamp, second.timestamp, "existing record returned");
    assert_eq!(stack.ledger.len().await?, 1, "no duplicate ledger entries");

    Ok(())
}

// ==================== TESTS: commit_epoch_once ====================

#[tokio::test]
async fn test_commit_epoch_once_empty_ledger_skips() -> Result<()> {
    let stack = test_stack();

    let committed =
        AshBridge::commit_epoch_once(&stack.ledger, &stack.proofs, &stack.registry, 0).await?;

    assert!(committed.is_none(), "empty ledger should not commit");
    assert!(
        stack.registry.published_root(0).await?.is_none(),
        "nothing should reach the registry"
    );

    Ok(())
}

#[tokio::test]
async fn test_commit_epoch_once_publishes_and_stores_proofs() -> Result<()> {
    let stack = test_stack();

    let burn_a = test_burn(1, &[1, 2, 3]);
    let burn_b = test_burn(2, &[4, 5, 6]);
    AshBridge::observe_once(&stack.ledger, &burn_a).await?;
    AshBridge::observe_once(&stack.ledger, &burn_b).await?;

    let committed =
        AshBridge::commit_epoch_once(&stack.ledger, &stack.proofs, &stack.registry, 7).await?;

    let commitment = committed.expect("two burns should commit");
    assert_eq!(commitment.epoch, 7);
    assert_eq!(commitment.leaf_count, 2);
    assert_eq!(
        stack.registry.published_root(7).await?,
        Some(commitment.root),
        "root must be published on the destination"
    );

    // Each holder's proof is retrievable by the canonical lookup
    match stack
        .proofs
        .lookup(&burn_a.holder_address, &burn_a.token_ids, None)
        .await
    {
        LookupResult::Found { proof, .. } => {
            assert_eq!(proof.siblings.len(), 1, "two-leaf tree has one sibling");
        }
        LookupResult::NotFound { .. } => panic!("proof for holder A should be stored"),
    }

    Ok(())
}

#[tokio::test]
async fn test_commit_epoch_once_duplicate_identity_single_leaf() -> Result<()> {
    let stack = test_stack();

    // Two observations of the same holder and tokens collapse in the ledger
    AshBridge::observe_once(&stack.ledger, &test_burn(1, &[1, 2])).await?;
    AshBridge::observe_once(&stack.ledger, &test_burn(1, &[2, 1])).await?;

    let committed =
        AshBridge::commit_epoch_once(&stack.ledger, &stack.proofs, &stack.registry, 0).await?;

    assert_eq!(committed.expect("should commit").leaf_count, 1);

    Ok(())
}

// ==================== TESTS: epoch_cycle_once ====================

#[tokio::test]
async fn test_epoch_cycle_once_advances_and_persists_counter() -> Result<()> {
    let stack = test_stack();
    let next_epoch = tokio::sync::Mutex::new(0u64);

    AshBridge::observe_once(&stack.ledger, &test_burn(1, &[1])).await?;

    let committed = AshBridge::epoch_cycle_once(
        &stack.ledger,
        &stack.proofs,
        &stack.registry,
        &stack.durable,
        &next_epoch,
    )
    .await?;

    assert_eq!(committed.expect("should commit").epoch, 0);
    assert_eq!(*next_epoch.lock().await, 1, "counter advances after commit");
    assert_eq!(
        stack.durable.get("epoch/next").await?.as_deref(),
        Some("1"),
        "counter persisted for restarts"
    );

    Ok(())
}

#[tokio::test]
async fn test_epoch_cycle_once_empty_ledger_holds_counter() -> Result<()> {
    let stack = test_stack();
    let next_epoch = tokio::sync::Mutex::new(0u64);

    let committed = AshBridge::epoch_cycle_once(
        &stack.ledger,
        &stack.proofs,
        &stack.registry,
        &stack.durable,
        &next_epoch,
    )
    .await?;

    assert!(committed.is_none());
    assert_eq!(*next_epoch.lock().await, 0, "no commit, no advance");
    assert!(stack.durable.get("epoch/next").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_epoch_cycle_twice_uses_distinct_epochs() -> Result<()> {
    let stack = test_stack();
    let next_epoch = tokio::sync::Mutex::new(0u64);

    AshBridge::observe_once(&stack.ledger, &test_burn(1, &[1])).await?;

    let first = AshBridge::epoch_cycle_once(
        &stack.ledger,
        &stack.proofs,
        &stack.registry,
        &stack.durable,
        &next_epoch,
    )
    .await?
    .expect("first cycle commits");

    AshBridge::observe_once(&stack.ledger, &test_burn(2, &[2])).await?;

    let second = AshBridge::epoch_cycle_once(
        &stack.ledger,
        &stack.proofs,
        &stack.registry,
        &stack.durable,
        &next_epoch,
    )
    .await?
    .expect("second cycle commits");

    assert_eq!(first.epoch, 0);
    assert_eq!(second.epoch, 1);
    assert_ne!(first.root, second.root, "ledger grew, root must change");
    assert_eq!(stack.sim.claims_accepted(), 0, "no claims were made");

    Ok(())
}

// ==================== TESTS: restore_epoch_counter ====================

#[tokio::test]
async fn test_restore_epoch_counter_reads_persisted_value() -> Result<()> {
    let mem = MemoryDurableStore::new();
    mem.put("epoch/next", "7").await?;

    let bridge = test_bridge(mem);
    bridge.restore_epoch_counter().await?;

    assert_eq!(*bridge.next_epoch.lock().await, 7);

    Ok(())
}

#[tokio::test]
async fn test_restore_epoch_counter_fresh_store_starts_at_zero() -> Result<()> {
    let bridge = test_bridge(MemoryDurableStore::new());
    bridge.restore_epoch_counter().await?;

    assert_eq!(*bridge.next_epoch.lock().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_restore_epoch_counter_rejects_corrupt_value() -> Result<()> {
    let mem = MemoryDurableStore::new();
    mem.put("epoch/next", "not-a-number").await?;

    let bridge = test_bridge(mem);
    let result = bridge.restore_epoch_counter().await;

    assert!(result.is_err(), "corrupt counter must not start at zero silently");

    Ok(())
}
