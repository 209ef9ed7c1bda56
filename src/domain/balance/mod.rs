//! Balance domain: per-denom subaccount deposits.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::domain::snapshot::SnapshotEntity;
use crate::shared::{Denom, SubaccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A subaccount's deposit of one denom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub subaccount_id: SubaccountId,
    pub denom: Denom,
    pub total_balance: Decimal,
    pub available_balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    /// Amount locked in open orders or margin.
    pub fn locked(&self) -> Decimal {
        self.total_balance - self.available_balance
    }
}

impl SnapshotEntity for Balance {
    type Key = Denom;

    fn key(&self) -> Denom {
        self.denom.clone()
    }
}
