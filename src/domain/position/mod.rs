//! Position domain: derivative positions held by a subaccount.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use crate::domain::snapshot::SnapshotEntity;
use crate::shared::{MarketId, SubaccountId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── TradeDirection ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "long"),
            TradeDirection::Short => write!(f, "short"),
        }
    }
}

// ─── Position ────────────────────────────────────────────────────────────────

/// A subaccount's open position in one derivative market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub subaccount_id: SubaccountId,
    pub market_id: MarketId,
    pub ticker: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub margin: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Notional value at entry.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.entry_price
    }
}

impl SnapshotEntity for Position {
    type Key = MarketId;

    fn key(&self) -> MarketId {
        self.market_id.clone()
    }

    fn is_terminal(&self) -> bool {
        self.quantity.is_zero()
    }
}
