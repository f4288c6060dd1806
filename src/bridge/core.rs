//! Core AshBridge struct and initialization - no business logic.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use crate::cache::TieredCache;
use crate::config::{BaseConfig, GatewayType, RegistryType};
use crate::durable::{DurableStoreVariant, RocksDurableStore};
use crate::feed::BurnFeedVariant;
use crate::gateway::{
    ClaimGatewayVariant, HttpClaimGateway, HttpRootRegistry, MockClaimGateway, NoopClaimGateway,
    NoopRootRegistry, RootRegistryVariant, SimulatedChain,
};
use crate::proofs::{MatchPolicy, ProofStore};
use crate::redemption::{BurnLedger, RedemptionCoordinator};

/// Main application orchestrator: burn feed in, epoch commitments out,
/// redemptions through the coordinator.
pub struct AshBridge {
    /// Burn observation source.
    pub feed: BurnFeedVariant,

    /// Published-root surface on the destination side.
    pub registry: Arc<RootRegistryVariant>,

    /// Global/base configuration.
    pub config: BaseConfig,

    /// Shared durable layer (RocksDB in production).
    pub durable: Arc<DurableStoreVariant>,

    /// Tiered proof cache over the durable layer.
    pub cache: Arc<TieredCache>,

    /// Proof store on top of the cache.
    pub proofs: Arc<ProofStore>,

    /// Append-only burn ledger.
    pub ledger: Arc<BurnLedger>,

    /// Redemption state machine.
    pub coordinator: Arc<RedemptionCoordinator>,

    /// Next epoch number to commit, persisted across restarts.
    pub next_epoch: Arc<tokio::sync::Mutex<u64>>,
}

impl AshBridge {
    /// Create a new AshBridge from explicit seam implementations.
    pub fn new(
        feed: BurnFeedVariant,
        registry: RootRegistryVariant,
        gateway: ClaimGatewayVariant,
        durable: DurableStoreVariant,
        config: BaseConfig,
    ) -> Self {
        let durable = Arc::new(durable);
        let cache = Arc::new(TieredCache::new(
            &config.cache_namespace,
            Arc::clone(&durable),
        ));
        let policy = MatchPolicy::new(config.same_address_overlap, config.cross_address_overlap);
        let proofs = Arc::new(ProofStore::new(
            Arc::clone(&cache),
            policy,
            Duration::from_secs(config.proof_ttl_secs),
        ));
        let ledger = Arc::new(BurnLedger::new(Arc::clone(&durable)));
        let coordinator = Arc::new(RedemptionCoordinator::new(
            Arc::clone(&ledger),
            Arc::clone(&proofs),
            Arc::new(gateway),
            config.redemption_rate,
            Duration::from_secs(config.claim_timeout_secs),
        ));

        Self {
            feed,
            registry: Arc::new(registry),
            config,
            durable,
            cache,
            proofs,
            ledger,
            coordinator,
            next_epoch: Arc::new(tokio::sync::Mutex::new(0)),
        }
    }

    /// Initialize AshBridge from configuration: open storage, build the
    /// configured seam backends, restore the epoch counter.
    pub async fn initialize(config: BaseConfig) -> Result<Self> {
        let durable = DurableStoreVariant::Rocks(RocksDurableStore::open(&config.storage_path)?);
        info!("Durable store opened at: {}", config.storage_path);

        let feed = BurnFeedVariant::new(config.feed_type);

        // when both destination seams are simulated they share one chain
        let shared_sim = SimulatedChain::new();
        let registry = match config.registry_type {
            RegistryType::Sim => RootRegistryVariant::Sim(shared_sim.clone()),
            RegistryType::Http => match &config.registry_url {
                Some(url) => RootRegistryVariant::Http(HttpRootRegistry::new(url)?),
                None => bail!("--registry-url is required for --registry-type http"),
            },
            RegistryType::Noop => RootRegistryVariant::Noop(NoopRootRegistry),
        };
        let gateway = match config.gateway_type {
            GatewayType::Sim => ClaimGatewayVariant::Sim(shared_sim),
            GatewayType::Http => match &config.gateway_url {
                Some(url) => ClaimGatewayVariant::Http(HttpClaimGateway::new(url)?),
                None => bail!("--gateway-url is required for --gateway-type http"),
            },
            GatewayType::Mock => ClaimGatewayVariant::Mock(MockClaimGateway::new()),
            GatewayType::Noop => ClaimGatewayVariant::Noop(NoopClaimGateway),
        };

        let bridge = Self::new(feed, registry, gateway, durable, config);
        bridge.restore_epoch_counter().await?;
        Ok(bridge)
    }
}
