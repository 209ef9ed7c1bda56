//! Wire types for balance responses (REST + stream).

use crate::shared::{serde_util, Denom, SubaccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// REST response for subaccount balances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalancesResponse {
    #[serde(default)]
    pub balances: Vec<BalanceWire>,
}

/// A single subaccount balance as the indexer sends it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceWire {
    pub subaccount_id: SubaccountId,
    pub denom: Denom,
    pub deposit: DepositWire,
    #[serde(with = "serde_util::timestamp_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepositWire {
    pub total_balance: Decimal,
    pub available_balance: Decimal,
}
