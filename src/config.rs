use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Burn feed backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    Mock,
    Noop,
}

/// Claim gateway backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayType {
    Sim,
    Http,
    Mock,
    Noop,
}

/// Root registry backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryType {
    Sim,
    Http,
    Noop,
}

/// Base configuration for the app, parsed from CLI arguments.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "ashbridge", about = "Burn-and-claim redemption core")]
pub struct BaseConfig {
    /// Path for persistent storage (RocksDB).
    #[arg(long, default_value = "./data")]
    pub storage_path: String,

    /// Duration of one epoch window in seconds
    /// (86400 for "one commitment per day").
    #[arg(long, default_value_t = 86400)]
    pub epoch_interval_secs: u64,

    /// Exact number of token ids one redemption must present.
    #[arg(long, default_value_t = 25)]
    pub redemption_rate: usize,

    /// Proof lifetime in seconds. Proofs must survive until redeemed;
    /// ten years stands in for "no expiry" under the cache's uniform
    /// TTL contract.
    #[arg(long, default_value_t = 315_360_000)]
    pub proof_ttl_secs: u64,

    /// Cache namespace prefix for proof entries.
    #[arg(long, default_value = "ashbridge")]
    pub cache_namespace: String,

    /// Minimum token overlap for an approximate match when the stored
    /// address equals the query address.
    #[arg(long, default_value_t = 0.90)]
    pub same_address_overlap: f64,

    /// Minimum token overlap for an approximate match regardless of
    /// address.
    #[arg(long, default_value_t = 0.95)]
    pub cross_address_overlap: f64,

    /// Upper bound on one claim submission, in seconds.
    #[arg(long, default_value_t = 30)]
    pub claim_timeout_secs: u64,

    /// Burn feed backend.
    #[arg(long, value_enum, default_value_t = FeedType::Noop)]
    pub feed_type: FeedType,

    /// Claim gateway backend.
    #[arg(long, value_enum, default_value_t = GatewayType::Sim)]
    pub gateway_type: GatewayType,

    /// Root registry backend.
    #[arg(long, value_enum, default_value_t = RegistryType::Sim)]
    pub registry_type: RegistryType,

    /// Base URL of the claim relay, required for `--gateway-type http`.
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Base URL of the root registry, required for `--registry-type http`.
    #[arg(long)]
    pub registry_url: Option<String>,

    /// Print a proof store diagnosis report and exit.
    #[arg(long, default_value_t = false)]
    pub diagnose: bool,

    /// Repair the proof store and exit.
    #[arg(long, default_value_t = false)]
    pub repair: bool,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            storage_path: "./data".to_string(),
            epoch_interval_secs: 86400, // 1 day
            redemption_rate: 25,
            proof_ttl_secs: 315_360_000, // 10 years
            cache_namespace: "ashbridge".to_string(),
            same_address_overlap: 0.90,
            cross_address_overlap: 0.95,
            claim_timeout_secs: 30,
            feed_type: FeedType::Noop,
            gateway_type: GatewayType::Sim,
            registry_type: RegistryType::Sim,
            gateway_url: None,
            registry_url: None,
            diagnose: false,
            repair: false,
        }
    }
}
