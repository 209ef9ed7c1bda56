//! Positions sub-client: subaccount position queries.

use crate::client::IndexerClient;
use crate::domain::position::wire::PositionsResponse;
use crate::domain::position::Position;
use crate::error::SdkError;
use crate::shared::{MarketId, SubaccountId};

pub struct Positions<'a> {
    pub(crate) client: &'a IndexerClient,
}

impl<'a> Positions<'a> {
    /// Get the raw positions response for a subaccount, optionally filtered
    /// to a set of markets.
    pub async fn get_raw(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<PositionsResponse, SdkError> {
        Ok(self
            .client
            .http
            .get_subaccount_positions(subaccount_id, market_ids)
            .await?)
    }

    /// Get positions for a subaccount, optionally filtered to a set of markets.
    pub async fn get(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Position>, SdkError> {
        Ok(self.get_raw(subaccount_id, market_ids).await?.into())
    }
}
