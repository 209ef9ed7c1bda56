//! Wire types for order responses (REST + stream).

use super::{OrderSide, OrderState};
use crate::shared::{serde_util, MarketId, SubaccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// REST response for a subaccount's orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<OrderWire>,
}

/// A single order as the indexer sends it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderWire {
    pub order_hash: String,
    pub subaccount_id: SubaccountId,
    pub market_id: MarketId,
    pub order_side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub unfilled_quantity: Decimal,
    pub state: OrderState,
    #[serde(with = "serde_util::timestamp_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_util::timestamp_ms")]
    pub updated_at: DateTime<Utc>,
}
