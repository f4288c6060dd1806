//! Async task orchestration with tokio::spawn - calls business logic from core.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kanal::unbounded_async;
use tracing::{debug, error, info, span, Instrument, Level};

use super::core::AshBridge;
use crate::commitment;
use crate::durable::DurableStoreVariant;
use crate::gateway::RootRegistryVariant;
use crate::proofs::{DiagnosisReport, ProofStore};
use crate::redemption::BurnLedger;
use crate::traits::{BurnFeed, DurableStore, RootRegistry};
use crate::types::{
    now_secs, to_0x_hex, BurnRecord, EpochCommitment, ObservedBurn, RedemptionClaim,
};

/// Durable key holding the next epoch number, so restarts never reuse an
/// epoch. Lives outside every cache namespace.
const EPOCH_COUNTER_KEY: &str = "epoch/next";

impl AshBridge {
    /// Run the application: spawn all tasks and orchestrate the system.
    pub async fn run(self) -> Result<()> {
        info!(
            "Starting AshBridge with epoch_interval_secs={}",
            self.config.epoch_interval_secs
        );

        let (burn_tx, burn_rx) = unbounded_async::<ObservedBurn>();

        // Destructure self so we can move individual fields into tasks.
        let AshBridge {
            mut feed,
            registry,
            config,
            durable,
            cache: _cache,
            proofs,
            ledger,
            coordinator: _coordinator,
            next_epoch,
        } = self;

        // === Feed task: open the burn source and hand it the channel ===
        let feed_handle = tokio::spawn(
            async move {
                info!("Starting burn feed: {}", feed.name());
                match feed.open(burn_tx).await {
                    Ok(()) => Ok::<(), anyhow::Error>(()),
                    Err(e) => {
                        error!("Burn feed failed: {}", e);
                        Err(e)
                    }
                }
            }
            .instrument(span!(Level::INFO, "feed_task")),
        );

        // === Ledger task: consume observations and append to the ledger ===
        let ledger_handle = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(
                async move {
                    info!("Starting burn ledger loop");

                    while let Ok(burn) = burn_rx.recv().await {
                        if let Err(e) = AshBridge::observe_once(&ledger, &burn).await {
                            error!("Failed to record burn: {}", e);
                        }
                    }

                    info!("Burn ledger loop finished (channel closed)");
                    Ok::<(), anyhow::Error>(())
                }
                .instrument(span!(Level::INFO, "ledger_task")),
            )
        };

        // === Epoch task: periodically commit and publish the ledger ===
        let epoch_handle = {
            let ledger = Arc::clone(&ledger);
            let proofs = Arc::clone(&proofs);
            let registry = Arc::clone(&registry);
            let durable = Arc::clone(&durable);
            let next_epoch = Arc::clone(&next_epoch);
            let interval_secs = config.epoch_interval_secs;

            tokio::spawn(
                async move {
                    info!("Epoch task started (epoch_interval_secs={})", interval_secs);

                    loop {
                        tokio::time::sleep(Duration::from_secs(interval_secs)).await;

                        match AshBridge::epoch_cycle_once(
                            &ledger,
                            &proofs,
                            &registry,
                            &durable,
                            &next_epoch,
                        )
                        .await
                        {
                            Ok(Some(commitment)) => {
                                info!(
                                    "Epoch {} committed ({} leaves)",
                                    commitment.epoch, commitment.leaf_count
                                );
                            }
                            Ok(None) => {
                                debug!("No burns recorded, epoch skipped");
                            }
                            Err(e) => {
                                error!("Error in epoch cycle: {}", e);
                            }
                        }
                    }
                    // This will never be reached but satisfies return type
                    #[allow(unreachable_code)]
                    Ok::<(), anyhow::Error>(())
                }
                .instrument(span!(Level::INFO, "epoch_task")),
            )
        };

        // Skeleton task for future work
        let claim_api_handle = tokio::spawn(async move {
            let span = span!(Level::INFO, "claim_api_task");
            let _enter = span.enter();

            debug!("Claim API task skeleton running");
            // Future work: expose coordinator.redeem over an HTTP surface.
            Ok::<(), anyhow::Error>(())
        });

        // Wait for all tasks to complete.
        let (feed_res, ledger_res, epoch_res, claim_api_res) =
            tokio::join!(feed_handle, ledger_handle, epoch_handle, claim_api_handle);

        feed_res??;
        ledger_res??;
        epoch_res??;
        claim_api_res??;

        info!("AshBridge run completed");
        Ok(())
    }

    // ==== business logic, callable without spawning ====

    /// Record one observed burn into the ledger.
    pub async fn observe_once(ledger: &BurnLedger, burn: &ObservedBurn) -> Result<BurnRecord> {
        ledger.record(burn).await
    }

    /// Build one epoch commitment over the full ledger, publish its root,
    /// and store the per-holder proofs. Empty ledgers are skipped.
    pub async fn commit_epoch_once(
        ledger: &BurnLedger,
        proofs: &ProofStore,
        registry: &RootRegistryVariant,
        epoch: u64,
    ) -> Result<Option<EpochCommitment>> {
        let records = ledger.all().await?;
        if records.is_empty() {
            return Ok(None);
        }

        let batch = commitment::build(&records)?;
        let commitment = EpochCommitment {
            epoch,
            root: batch.root,
            leaf_count: batch.tree.leaf_count() as u64,
            committed_at: now_secs(),
        };

        registry.publish(&commitment).await?;
        proofs.store_batch(&batch.root, &batch.proofs_by_key).await;

        info!(
            "Committed epoch {} (root={}, leaves={})",
            epoch,
            to_0x_hex(&batch.root),
            commitment.leaf_count
        );
        Ok(Some(commitment))
    }

    /// One epoch cycle: commit, then advance and persist the counter so a
    /// restart never reuses an epoch number.
    pub async fn epoch_cycle_once(
        ledger: &BurnLedger,
        proofs: &ProofStore,
        registry: &RootRegistryVariant,
        durable: &DurableStoreVariant,
        next_epoch: &tokio::sync::Mutex<u64>,
    ) -> Result<Option<EpochCommitment>> {
        let mut counter = next_epoch.lock().await;
        let committed = Self::commit_epoch_once(ledger, proofs, registry, *counter).await?;
        if committed.is_some() {
            *counter += 1;
            durable.put(EPOCH_COUNTER_KEY, &counter.to_string()).await?;
        }
        Ok(committed)
    }

    /// Load the persisted epoch counter; fresh stores start at zero.
    pub async fn restore_epoch_counter(&self) -> Result<()> {
        if let Some(raw) = self.durable.get(EPOCH_COUNTER_KEY).await? {
            let value = raw.parse::<u64>().context("corrupt epoch counter")?;
            *self.next_epoch.lock().await = value;
            info!("Epoch counter restored: next epoch {}", value);
        }
        Ok(())
    }

    /// Run one redemption attempt through the coordinator.
    pub async fn redeem(
        &self,
        address: &str,
        token_ids: &[u64],
        source_tx_hash: &str,
    ) -> Result<RedemptionClaim> {
        self.coordinator
            .redeem(address, token_ids, source_tx_hash)
            .await
    }

    /// Proof store diagnosis, for the operational CLI surface.
    pub async fn diagnose(&self) -> DiagnosisReport {
        self.proofs.diagnose().await
    }

    /// Proof store repair, for the operational CLI surface.
    pub async fn repair(&self) -> usize {
        self.proofs.repair().await
    }
}
