//! Order domain: a subaccount's resting orders.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::domain::snapshot::SnapshotEntity;
use crate::shared::{MarketId, SubaccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── OrderSide ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

// ─── OrderState ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Booked,
    PartialFilled,
    Filled,
    Canceled,
}

impl OrderState {
    /// Whether the order can still trade.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderState::Booked | OrderState::PartialFilled)
    }
}

// ─── Order ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_hash: String,
    pub subaccount_id: SubaccountId,
    pub market_id: MarketId,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub unfilled_quantity: Decimal,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn filled_quantity(&self) -> Decimal {
        self.quantity - self.unfilled_quantity
    }
}

impl SnapshotEntity for Order {
    type Key = String;

    fn key(&self) -> String {
        self.order_hash.clone()
    }

    fn is_terminal(&self) -> bool {
        !self.state.is_open()
    }
}
