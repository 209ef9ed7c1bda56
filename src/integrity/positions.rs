//! Position reconciliation.

use super::{is_subset_by, IntegrityStrategy};
use crate::context::AppContext;
use crate::domain::position::Position;
use crate::domain::snapshot::SharedSnapshot;
use crate::error::SdkError;
use crate::shared::{MarketId, SubaccountId};
use crate::source::SnapshotSource;
use crate::stream::StreamKind;
use async_trait::async_trait;

/// Checks cached positions against the indexer.
///
/// A cached position is still valid when the backend reports a position in
/// the same market with the same last-update timestamp.
#[derive(Debug, Clone, Default)]
pub struct PositionIntegrity {
    market_ids: Vec<MarketId>,
}

impl PositionIntegrity {
    /// Scope the check to `market_ids`; an empty list covers every market.
    pub fn new(market_ids: Vec<MarketId>) -> Self {
        Self { market_ids }
    }
}

#[async_trait]
impl IntegrityStrategy for PositionIntegrity {
    type Args = Vec<MarketId>;
    type Entity = Position;

    const KIND: StreamKind = StreamKind::SubaccountPositions;

    fn args(&self) -> &Vec<MarketId> {
        &self.market_ids
    }

    fn cache<'c>(&self, ctx: &'c AppContext) -> &'c SharedSnapshot<Position> {
        ctx.positions()
    }

    async fn fetch_data(
        &self,
        source: &dyn SnapshotSource,
        subaccount_id: &SubaccountId,
    ) -> Result<Vec<Position>, SdkError> {
        source.fetch_positions(subaccount_id, &self.market_ids).await
    }

    fn verify_data(&self, cached: &[Position], fresh: &[Position]) -> bool {
        is_subset_by(cached, fresh, |p| (p.market_id.clone(), p.updated_at))
    }

    fn in_scope(&self, position: &Position) -> bool {
        self.market_ids.is_empty() || self.market_ids.contains(&position.market_id)
    }

    fn stream_market(&self) -> Option<MarketId> {
        self.market_ids.first().cloned()
    }
}
