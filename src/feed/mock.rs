use anyhow::Result;
use async_trait::async_trait;
use kanal::AsyncSender;

use crate::traits::BurnFeed;
use crate::types::ObservedBurn;

/// Mock burn feed for testing.
pub struct MockBurnFeed {
    pub burns: Vec<ObservedBurn>,
    pub delay_ms: u64,
}

impl MockBurnFeed {
    pub fn new(burns: Vec<ObservedBurn>, delay_ms: u64) -> Self {
        Self { burns, delay_ms }
    }
}

impl Default for MockBurnFeed {
    fn default() -> Self {
        Self {
            burns: Vec::new(),
            delay_ms: 0,
        }
    }
}

#[async_trait]
impl BurnFeed for MockBurnFeed {
    fn name(&self) -> &'static str {
        "mock-feed"
    }

    async fn open(&mut self, tx: AsyncSender<ObservedBurn>) -> Result<()> {
        let burns = self.burns.clone();
        let delay = self.delay_ms;

        tokio::spawn(async move {
            for burn in burns {
                if delay > 0 {
                    tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                }
                if tx.send(burn).await.is_err() {
                    break;
                }
            }
        });

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
