//! Balances sub-client: subaccount deposit queries.

use crate::client::IndexerClient;
use crate::domain::balance::wire::BalancesResponse;
use crate::domain::balance::Balance;
use crate::error::SdkError;
use crate::shared::{Denom, SubaccountId};

pub struct Balances<'a> {
    pub(crate) client: &'a IndexerClient,
}

impl<'a> Balances<'a> {
    pub async fn get_raw(
        &self,
        subaccount_id: &SubaccountId,
        denoms: &[Denom],
    ) -> Result<BalancesResponse, SdkError> {
        Ok(self
            .client
            .http
            .get_subaccount_balances(subaccount_id, denoms)
            .await?)
    }

    /// Get balances for a subaccount. An empty `denoms` slice returns every denom.
    pub async fn get(
        &self,
        subaccount_id: &SubaccountId,
        denoms: &[Denom],
    ) -> Result<Vec<Balance>, SdkError> {
        Ok(self.get_raw(subaccount_id, denoms).await?.into())
    }
}
