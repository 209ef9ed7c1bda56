//! The remote data source reconciliation fetches authoritative snapshots from.

use crate::domain::balance::Balance;
use crate::domain::order::Order;
use crate::domain::position::Position;
use crate::error::SdkError;
use crate::shared::{Denom, MarketId, SubaccountId};
use async_trait::async_trait;

/// Query interface returning entity snapshots for one subaccount.
///
/// Empty filter slices mean "no filter". Implemented over REST by
/// [`IndexerClient`](crate::client::IndexerClient).
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_positions(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Position>, SdkError>;

    async fn fetch_balances(
        &self,
        subaccount_id: &SubaccountId,
        denoms: &[Denom],
    ) -> Result<Vec<Balance>, SdkError>;

    async fn fetch_orders(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Order>, SdkError>;
}
