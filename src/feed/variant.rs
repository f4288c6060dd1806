use anyhow::Result;
use async_trait::async_trait;
use kanal::AsyncSender;

use super::{mock::MockBurnFeed, noop::NoopBurnFeed};
use crate::config::FeedType;
use crate::traits::BurnFeed;
use crate::types::ObservedBurn;

/// Enum representing all possible burn feed implementations.
pub enum BurnFeedVariant {
    Mock(MockBurnFeed),
    Noop(NoopBurnFeed),
}

impl BurnFeedVariant {
    /// Create a new burn feed instance based on the specified type.
    pub fn new(feed_type: FeedType) -> Self {
        match feed_type {
            FeedType::Mock => BurnFeedVariant::Mock(MockBurnFeed::default()),
            FeedType::Noop => BurnFeedVariant::Noop(NoopBurnFeed),
        }
    }
}

#[async_trait]
impl BurnFeed for BurnFeedVariant {
    fn name(&self) -> &'static str {
        match self {
            BurnFeedVariant::Mock(inner) => inner.name(),
            BurnFeedVariant::Noop(inner) => inner.name(),
        }
    }

    async fn open(&mut self, tx: AsyncSender<ObservedBurn>) -> Result<()> {
        match self {
            BurnFeedVariant::Mock(inner) => inner.open(tx).await,
            BurnFeedVariant::Noop(inner) => inner.open(tx).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            BurnFeedVariant::Mock(inner) => inner.close().await,
            BurnFeedVariant::Noop(inner) => inner.close().await,
        }
    }
}
