use anyhow::Result;
use async_trait::async_trait;
use kanal::AsyncSender;

use crate::types::ObservedBurn;

/// Trait for burn-event sources (source-chain log scanners, replays, fixtures).
///
/// Implementations are responsible for producing `ObservedBurn`s into the
/// bridge's ingestion pipeline. The scan itself (RPC, log filters) lives
/// behind this seam; the core only consumes observations.
#[async_trait]
pub trait BurnFeed: Send + Sync {
    /// Human-readable feed name for logging.
    fn name(&self) -> &'static str;

    /// Open/start the feed with a channel to send observations.
    async fn open(&mut self, tx: AsyncSender<ObservedBurn>) -> Result<()>;

    /// Close/stop the feed and release resources.
    async fn close(&mut self) -> Result<()>;
}
