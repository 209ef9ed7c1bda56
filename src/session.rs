//! Wallet session: which wallet is connected and which subaccount is active.

use crate::shared::SubaccountId;
use parking_lot::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SessionState {
    address: Option<String>,
    subaccount_id: Option<SubaccountId>,
}

/// Connection state of the user's wallet.
///
/// Reconciliation only runs while a wallet is connected and a subaccount is
/// selected.
#[derive(Debug, Default)]
pub struct WalletSession {
    state: RwLock<SessionState>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a wallet as connected. The previous subaccount selection is kept
    /// only if the address is unchanged.
    pub fn connect(&self, address: impl Into<String>) {
        let address = address.into();
        let mut state = self.state.write();
        if state.address.as_deref() != Some(address.as_str()) {
            state.subaccount_id = None;
        }
        tracing::info!(address = %address, "Wallet connected");
        state.address = Some(address);
    }

    pub fn disconnect(&self) {
        let mut state = self.state.write();
        if let Some(address) = state.address.take() {
            tracing::info!(address = %address, "Wallet disconnected");
        }
        state.subaccount_id = None;
    }

    /// Select the active subaccount; `None` clears the selection.
    pub fn select_subaccount(&self, subaccount_id: Option<SubaccountId>) {
        self.state.write().subaccount_id = subaccount_id;
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().address.is_some()
    }

    pub fn address(&self) -> Option<String> {
        self.state.read().address.clone()
    }

    pub fn subaccount_id(&self) -> Option<SubaccountId> {
        self.state.read().subaccount_id.clone()
    }
}
