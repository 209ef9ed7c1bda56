//! Open-order reconciliation.

use super::{is_subset_by, IntegrityStrategy};
use crate::context::AppContext;
use crate::domain::order::Order;
use crate::domain::snapshot::SharedSnapshot;
use crate::error::SdkError;
use crate::shared::{MarketId, SubaccountId};
use crate::source::SnapshotSource;
use crate::stream::StreamKind;
use async_trait::async_trait;

/// Checks cached open orders against the indexer by order hash and
/// last-update timestamp. Orders the backend reports as filled or canceled
/// are not part of the fresh snapshot.
#[derive(Debug, Clone, Default)]
pub struct OrderIntegrity {
    market_ids: Vec<MarketId>,
}

impl OrderIntegrity {
    /// Scope the check to `market_ids`; an empty list covers every market.
    pub fn new(market_ids: Vec<MarketId>) -> Self {
        Self { market_ids }
    }
}

#[async_trait]
impl IntegrityStrategy for OrderIntegrity {
    type Args = Vec<MarketId>;
    type Entity = Order;

    const KIND: StreamKind = StreamKind::SubaccountOrders;

    fn args(&self) -> &Vec<MarketId> {
        &self.market_ids
    }

    fn cache<'c>(&self, ctx: &'c AppContext) -> &'c SharedSnapshot<Order> {
        ctx.orders()
    }

    async fn fetch_data(
        &self,
        source: &dyn SnapshotSource,
        subaccount_id: &SubaccountId,
    ) -> Result<Vec<Order>, SdkError> {
        let mut orders = source.fetch_orders(subaccount_id, &self.market_ids).await?;
        orders.retain(|o| o.state.is_open());
        Ok(orders)
    }

    fn verify_data(&self, cached: &[Order], fresh: &[Order]) -> bool {
        is_subset_by(cached, fresh, |o| (o.order_hash.clone(), o.updated_at))
    }

    fn in_scope(&self, order: &Order) -> bool {
        self.market_ids.is_empty() || self.market_ids.contains(&order.market_id)
    }

    fn stream_market(&self) -> Option<MarketId> {
        self.market_ids.first().cloned()
    }
}
