//! Orders sub-client: subaccount order queries.

use crate::client::IndexerClient;
use crate::domain::order::wire::OrdersResponse;
use crate::domain::order::Order;
use crate::error::SdkError;
use crate::shared::{MarketId, SubaccountId};

pub struct Orders<'a> {
    pub(crate) client: &'a IndexerClient,
}

impl<'a> Orders<'a> {
    pub async fn get_raw(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<OrdersResponse, SdkError> {
        Ok(self
            .client
            .http
            .get_subaccount_orders(subaccount_id, market_ids)
            .await?)
    }

    /// Get a subaccount's orders, optionally filtered to a set of markets.
    pub async fn get(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Order>, SdkError> {
        Ok(self.get_raw(subaccount_id, market_ids).await?.into())
    }

    /// Only the orders that can still trade.
    pub async fn open(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Order>, SdkError> {
        let mut orders = self.get(subaccount_id, market_ids).await?;
        orders.retain(|o| o.state.is_open());
        Ok(orders)
    }
}
