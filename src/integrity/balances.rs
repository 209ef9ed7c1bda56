//! Balance reconciliation.

use super::{is_subset_by, IntegrityStrategy};
use crate::context::AppContext;
use crate::domain::balance::Balance;
use crate::domain::snapshot::SharedSnapshot;
use crate::error::SdkError;
use crate::shared::{Denom, SubaccountId};
use crate::source::SnapshotSource;
use crate::stream::StreamKind;
use async_trait::async_trait;

/// Checks cached deposits against the indexer by denom and amounts.
///
/// Balance streams are subaccount-wide, so a resync never narrows the new
/// stream to a market.
#[derive(Debug, Clone, Default)]
pub struct BalanceIntegrity {
    denoms: Vec<Denom>,
}

impl BalanceIntegrity {
    /// Scope the check to `denoms`; an empty list covers every denom.
    pub fn new(denoms: Vec<Denom>) -> Self {
        Self { denoms }
    }
}

#[async_trait]
impl IntegrityStrategy for BalanceIntegrity {
    type Args = Vec<Denom>;
    type Entity = Balance;

    const KIND: StreamKind = StreamKind::SubaccountBalances;

    fn args(&self) -> &Vec<Denom> {
        &self.denoms
    }

    fn cache<'c>(&self, ctx: &'c AppContext) -> &'c SharedSnapshot<Balance> {
        ctx.balances()
    }

    async fn fetch_data(
        &self,
        source: &dyn SnapshotSource,
        subaccount_id: &SubaccountId,
    ) -> Result<Vec<Balance>, SdkError> {
        source.fetch_balances(subaccount_id, &self.denoms).await
    }

    fn verify_data(&self, cached: &[Balance], fresh: &[Balance]) -> bool {
        is_subset_by(cached, fresh, |b| {
            (b.denom.clone(), b.total_balance, b.available_balance)
        })
    }

    fn in_scope(&self, balance: &Balance) -> bool {
        self.denoms.is_empty() || self.denoms.contains(&balance.denom)
    }
}
