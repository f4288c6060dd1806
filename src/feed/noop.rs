use anyhow::Result;
use async_trait::async_trait;
use kanal::AsyncSender;

use crate::traits::BurnFeed;
use crate::types::ObservedBurn;

/// Noop burn feed for demonstration purposes.
pub struct NoopBurnFeed;

#[async_trait]
impl BurnFeed for NoopBurnFeed {
    fn name(&self) -> &'static str {
        "noop-feed"
    }

    async fn open(&mut self, _tx: AsyncSender<ObservedBurn>) -> Result<()> {
        tracing::info!("NoopBurnFeed: open() called - no burns to send");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        tracing::info!("NoopBurnFeed: close() called");
        Ok(())
    }
}
