//! Conversions: order wire types → Order domain types.

use super::wire;
use super::Order;

impl From<wire::OrderWire> for Order {
    fn from(w: wire::OrderWire) -> Self {
        Order {
            order_hash: w.order_hash,
            subaccount_id: w.subaccount_id,
            market_id: w.market_id,
            side: w.order_side,
            price: w.price,
            quantity: w.quantity,
            unfilled_quantity: w.unfilled_quantity,
            state: w.state,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

impl From<wire::OrdersResponse> for Vec<Order> {
    fn from(resp: wire::OrdersResponse) -> Self {
        resp.orders.into_iter().map(Order::from).collect()
    }
}
