//! Conversions: position wire types → Position domain types.

use super::wire;
use super::Position;

impl From<wire::PositionWire> for Position {
    fn from(w: wire::PositionWire) -> Self {
        Position {
            subaccount_id: w.subaccount_id,
            market_id: w.market_id,
            ticker: w.ticker,
            direction: w.direction,
            quantity: w.quantity,
            entry_price: w.entry_price,
            margin: w.margin,
            updated_at: w.updated_at,
        }
    }
}

impl From<wire::PositionsResponse> for Vec<Position> {
    fn from(resp: wire::PositionsResponse) -> Self {
        resp.positions.into_iter().map(Position::from).collect()
    }
}
