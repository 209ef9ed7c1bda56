//! Wire types for position responses (REST + stream).

use super::TradeDirection;
use crate::shared::{serde_util, MarketId, SubaccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// REST response for subaccount positions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionsResponse {
    #[serde(default)]
    pub positions: Vec<PositionWire>,
}

/// A single position as the indexer sends it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionWire {
    pub subaccount_id: SubaccountId,
    pub market_id: MarketId,
    #[serde(default)]
    pub ticker: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub margin: Decimal,
    #[serde(with = "serde_util::timestamp_ms")]
    pub updated_at: DateTime<Utc>,
}
