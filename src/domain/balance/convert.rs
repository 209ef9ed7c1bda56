//! Conversions: balance wire types → Balance domain types.

use super::wire;
use super::Balance;

impl From<wire::BalanceWire> for Balance {
    fn from(w: wire::BalanceWire) -> Self {
        Balance {
            subaccount_id: w.subaccount_id,
            denom: w.denom,
            total_balance: w.deposit.total_balance,
            available_balance: w.deposit.available_balance,
            updated_at: w.updated_at,
        }
    }
}

impl From<wire::BalancesResponse> for Vec<Balance> {
    fn from(resp: wire::BalancesResponse) -> Self {
        resp.balances.into_iter().map(Balance::from).collect()
    }
}
