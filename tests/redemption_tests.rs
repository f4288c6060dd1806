use std::sync::Arc;
use std::time::Duration;

use ::ashbridge::cache::TieredCache;
use ::ashbridge::commitment;
use ::ashbridge::durable::{DurableStoreVariant, MemoryDurableStore};
use ::ashbridge::gateway::{ClaimGatewayVariant, MockClaimGateway, MockOutcome, SimulatedChain};
use ::ashbridge::keys::ProofKey;
use ::ashbridge::proofs::{MatchPolicy, ProofStore};
use ::ashbridge::redemption::{BurnLedger, RedemptionCoordinator};
use ::ashbridge::traits::{ClaimGateway, RootRegistry};
use ::ashbridge::types::{EpochCommitment, FailReason, ObservedBurn, StoredProof};
use anyhow::Result;

// ===== Test Helper Functions =====

const RATE: usize = 3;

fn test_addr(id: u64) -> String {
    format!("0x{id:040x}")
}

fn test_tx(id: u64) -> String {
    format!("0x{id:064x}")
}

fn test_burn(addr_id: u64, token_ids: &[u64]) -> ObservedBurn {
    ObservedBurn {
        holder_address: test_addr(addr_id),
        token_ids: token_ids.to_vec(),
        source_tx_hash: test_tx(addr_id),
        block_number: 500 + addr_id,
    }
}

struct RedemptionStack {
    cache: Arc<TieredCache>,
    ledger: Arc<BurnLedger>,
    proofs: Arc<ProofStore>,
    mock: MockClaimGateway,
    coordinator: Arc<RedemptionCoordinator>,
}

fn test_stack(claim_timeout: Duration) -> RedemptionStack {
    let durable = Arc::new(DurableStoreVariant::Memory(MemoryDurableStore::new()));
    let cache = Arc::new(TieredCache::new("proofs", Arc::clone(&durable)));
    let ledger = Arc::new(BurnLedger::new(Arc::clone(&durable)));
    let proofs = Arc::new(ProofStore::new(
        Arc::clone(&cache),
        MatchPolicy::default(),
        Duration::from_secs(3600),
    ));
    let mock = MockClaimGateway::new();
    let coordinator = Arc::new(RedemptionCoordinator::new(
        Arc::clone(&ledger),
        Arc::clone(&proofs),
        Arc::new(ClaimGatewayVariant::Mock(mock.clone())),
        RATE,
        claim_timeout,
    ));
    RedemptionStack {
        cache,
        ledger,
        proofs,
        mock,
        coordinator,
    }
}

/// Record the burn and store a proof for it, like one feed-plus-epoch pass.
async fn seed_redeemable(stack: &RedemptionStack, burn: &ObservedBurn) -> Result<()> {
    let record = stack.ledger.record(burn).await?;
    let batch = commitment::build(std::slice::from_ref(&record))?;
    stack.proofs.store_batch(&batch.root, &batch.proofs_by_key).await;
    Ok(())
}

// ===== Input Gate Tests =====

#[tokio::test]
async fn test_wrong_token_count_fails_before_any_io() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));

    let claim = stack
        .coordinator
        .redeem(&test_addr(1), &[1, 2], &test_tx(1))
        .await?;

    assert_eq!(
        claim.fail_reason(),
        Some(&FailReason::WrongTokenCount { expected: RATE, got: 2 }),
    );
    assert_eq!(stack.mock.call_count(), 0, "gateway must not be touched");

    Ok(())
}

#[tokio::test]
async fn test_malformed_address_fails() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));

    let claim = stack
        .coordinator
        .redeem("0xnot-an-address", &[1, 2, 3], &test_tx(1))
        .await?;

    assert!(matches!(
        claim.fail_reason(),
        Some(FailReason::MalformedAddress(_))
    ));
    assert_eq!(stack.mock.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_burn_fails_with_no_such_burn() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));

    let claim = stack
        .coordinator
        .redeem(&test_addr(1), &[1, 2, 3], &test_tx(1))
        .await?;

    assert_eq!(claim.fail_reason(), Some(&FailReason::NoSuchBurn));
    assert_eq!(stack.mock.call_count(), 0);

    Ok(())
}

// ===== Redemption Flow Tests =====

#[tokio::test]
async fn test_successful_redemption_confirms_and_marks_ledger() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));
    let burn = test_burn(1, &[1, 2, 3]);
    seed_redeemable(&stack, &burn).await?;
    stack.mock.queue_outcome(MockOutcome::Accept);

    let claim = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;

    assert!(claim.is_confirmed(), "status was {:?}", claim.status);
    assert!(claim.destination_tx_hash.is_some());
    assert_eq!(stack.mock.call_count(), 1);

    let record = stack
        .ledger
        .find(&burn.holder_address, &burn.token_ids)
        .await?
        .expect("record exists");
    assert!(record.redeemed, "ledger must remember the redemption");

    Ok(())
}

#[tokio::test]
async fn test_already_redeemed_never_reaches_the_gateway() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));
    let burn = test_burn(1, &[1, 2, 3]);
    seed_redeemable(&stack, &burn).await?;
    stack.mock.queue_outcome(MockOutcome::Accept);

    let first = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;
    assert!(first.is_confirmed());

    // Second attempt for the same burn: refused from the ledger alone
    let second = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;
    assert_eq!(second.fail_reason(), Some(&FailReason::AlreadyRedeemed));
    assert_eq!(
        stack.mock.call_count(),
        1,
        "the duplicate must not produce a second submission"
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_proof_fails_with_proof_missing() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));
    let burn = test_burn(1, &[1, 2, 3]);

    // Burn recorded, but no epoch has committed it yet
    stack.ledger.record(&burn).await?;

    let claim = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;

    assert_eq!(claim.fail_reason(), Some(&FailReason::ProofMissing));
    assert_eq!(stack.mock.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_store_fails_with_store_corrupted() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));
    let burn = test_burn(1, &[1, 2, 3]);
    stack.ledger.record(&burn).await?;

    // The canonical slot holds hashes that cannot decode
    let key = ProofKey::new(&burn.holder_address, &burn.token_ids, None)?.to_string();
    let broken = StoredProof {
        key: key.clone(),
        root: "0xzz".to_string(),
        leaf: "0xzz".to_string(),
        siblings: vec!["not-hex".to_string()],
        generated_at: 0,
    };
    stack
        .cache
        .set(&key, &broken, Duration::from_secs(3600), true)
        .await;

    let claim = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;

    assert_eq!(claim.fail_reason(), Some(&FailReason::StoreCorrupted));
    assert!(
        !claim.fail_reason().map(FailReason::retryable).unwrap_or(true),
        "corruption needs repair, not a retry"
    );

    Ok(())
}

// ===== Gateway Outcome Tests =====

#[tokio::test]
async fn test_chain_rejection_maps_to_chain_rejected() -> Result<()> {
    let stack = test_stack(Duration::from_secs(5));
    let burn = test_burn(1, &[1, 2, 3]);
    seed_redeemable(&stack, &burn).await?;
    stack
        .mock
        .queue_outcome(MockOutcome::Reject("proof does not verify".to_string()));

    let claim = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;

    match claim.fail_reason() {
        Some(FailReason::ChainRejected(reason)) => {
            assert!(reason.contains("does not verify"));
        }
        other => panic!("expected ChainRejected, got {other:?}"),
    }

    // A rejected claim leaves the burn unredeemed
    let record = stack
        .ledger
        .find(&burn.holder_address, &burn.token_ids)
        .await?
        .expect("record exists");
    assert!(!record.redeemed);

    Ok(())
}

#[tokio::test]
async fn test_gateway_hang_maps_to_submit_timeout() -> Result<()> {
    let stack = test_stack(Duration::from_millis(300));
    let burn = test_burn(1, &[1, 2, 3]);
    seed_redeemable(&stack, &burn).await?;
    stack.mock.queue_outcome(MockOutcome::Hang);

    let claim = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;

    assert_eq!(claim.fail_reason(), Some(&FailReason::SubmitTimeout));
    assert!(
        claim.fail_reason().map(FailReason::retryable).unwrap_or(false),
        "timeouts are the one retryable failure"
    );

    // The burn stays unredeemed, so the retry can go through
    let record = stack
        .ledger
        .find(&burn.holder_address, &burn.token_ids)
        .await?
        .expect("record exists");
    assert!(!record.redeemed);

    Ok(())
}

// ===== Concurrency Tests =====

#[tokio::test]
async fn test_concurrent_redemptions_for_one_burn_serialize() -> Result<()> {
    let stack = test_stack(Duration::from_millis(300));
    let burn = test_burn(1, &[1, 2, 3]);
    seed_redeemable(&stack, &burn).await?;

    // First submission hangs into a timeout, the second is accepted.
    stack.mock.queue_outcome(MockOutcome::Hang);
    stack.mock.queue_outcome(MockOutcome::Accept);

    let a = {
        let coordinator = Arc::clone(&stack.coordinator);
        let burn = burn.clone();
        tokio::spawn(async move {
            coordinator
                .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
                .await
        })
    };
    let b = {
        let coordinator = Arc::clone(&stack.coordinator);
        let burn = burn.clone();
        tokio::spawn(async move {
            coordinator
                .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
                .await
        })
    };

    let claims = vec![a.await??, b.await??];

    let confirmed = claims.iter().filter(|c| c.is_confirmed()).count();
    let timed_out = claims
        .iter()
        .filter(|c| c.fail_reason() == Some(&FailReason::SubmitTimeout))
        .count();
    assert_eq!(confirmed, 1, "exactly one attempt may confirm");
    assert_eq!(timed_out, 1, "the serialized loser sees the hang");
    assert_eq!(stack.mock.call_count(), 2, "attempts ran one after the other");

    // A third attempt is refused outright
    let third = stack
        .coordinator
        .redeem(&burn.holder_address, &burn.token_ids, &burn.source_tx_hash)
        .await?;
    assert_eq!(third.fail_reason(), Some(&FailReason::AlreadyRedeemed));
    assert_eq!(stack.mock.call_count(), 2);

    Ok(())
}

// ===== Simulated Chain Tests =====

#[tokio::test]
async fn test_sim_chain_rejects_replayed_leaf() -> Result<()> {
    let sim = SimulatedChain::new();

    let record = ::ashbridge::types::BurnRecord {
        holder_address: test_addr(1),
        token_ids: vec![1, 2, 3],
        source_tx_hash: test_tx(1),
        timestamp: 1_700_000_000,
        redeemed: false,
    };
    let other = ::ashbridge::types::BurnRecord {
        holder_address: test_addr(2),
        token_ids: vec![4, 5, 6],
        source_tx_hash: test_tx(2),
        timestamp: 1_700_000_000,
        redeemed: false,
    };
    let batch = commitment::build(&[record.clone(), other])?;

    sim.publish(&EpochCommitment {
        epoch: 0,
        root: batch.root,
        leaf_count: batch.tree.leaf_count() as u64,
        committed_at: 1_700_000_000,
    })
    .await?;

    let key = ProofKey::new(&record.holder_address, &record.token_ids, None)?.to_string();
    let proof = &batch.proofs_by_key[&key];

    let receipt = sim
        .submit_claim(&record.holder_address, &record.token_ids, proof)
        .await?;
    assert!(receipt.tx_hash.starts_with("0x"));
    assert_eq!(sim.claims_accepted(), 1);

    // Replaying the same leaf must be rejected by the chain itself
    let replay = sim
        .submit_claim(&record.holder_address, &record.token_ids, proof)
        .await;
    let err = replay.expect_err("replay must fail");
    assert!(err.to_string().contains("already claimed"), "got: {err}");
    assert_eq!(sim.claims_accepted(), 1);

    Ok(())
}

#[tokio::test]
async fn test_sim_chain_rejects_mismatched_claim_fields() -> Result<()> {
    let sim = SimulatedChain::new();

    let record = ::ashbridge::types::BurnRecord {
        holder_address: test_addr(1),
        token_ids: vec![1, 2, 3],
        source_tx_hash: test_tx(1),
        timestamp: 1_700_000_000,
        redeemed: false,
    };
    let batch = commitment::build(std::slice::from_ref(&record))?;
    sim.publish(&EpochCommitment {
        epoch: 0,
        root: batch.root,
        leaf_count: 1,
        committed_at: 1_700_000_000,
    })
    .await?;

    let key = ProofKey::new(&record.holder_address, &record.token_ids, None)?.to_string();
    let proof = &batch.proofs_by_key[&key];

    // Proof belongs to holder 1; holder 2 cannot spend it
    let stolen = sim
        .submit_claim(&test_addr(2), &record.token_ids, proof)
        .await;
    assert!(stolen.is_err(), "claim fields must be bound into the leaf");
    assert_eq!(sim.claims_accepted(), 0);

    Ok(())
}
