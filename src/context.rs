//! Application context: the session, stores, streams and collaborators
//! that reconciliation runs against.

use crate::domain::balance::Balance;
use crate::domain::order::Order;
use crate::domain::position::Position;
use crate::domain::snapshot::{CachedSnapshot, SharedSnapshot};
use crate::error::SdkError;
use crate::integrity::guard::InFlight;
use crate::session::WalletSession;
use crate::shared::{MarketId, SubaccountId};
use crate::source::SnapshotSource;
use crate::stream::{
    StreamCallback, StreamHandle, StreamKind, StreamManager, StreamOpener, StreamParams,
    StreamUpdate,
};
use std::sync::Arc;

/// Everything reconciliation needs, passed explicitly instead of reached
/// through globals.
pub struct AppContext {
    session: WalletSession,
    positions: SharedSnapshot<Position>,
    balances: SharedSnapshot<Balance>,
    orders: SharedSnapshot<Order>,
    streams: StreamManager,
    source: Arc<dyn SnapshotSource>,
    opener: Arc<dyn StreamOpener>,
    in_flight: InFlight,
}

impl AppContext {
    pub fn new(source: Arc<dyn SnapshotSource>, opener: Arc<dyn StreamOpener>) -> Self {
        Self {
            session: WalletSession::new(),
            positions: CachedSnapshot::shared(),
            balances: CachedSnapshot::shared(),
            orders: CachedSnapshot::shared(),
            streams: StreamManager::new(),
            source,
            opener,
            in_flight: InFlight::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn positions(&self) -> &SharedSnapshot<Position> {
        &self.positions
    }

    pub fn balances(&self) -> &SharedSnapshot<Balance> {
        &self.balances
    }

    pub fn orders(&self) -> &SharedSnapshot<Order> {
        &self.orders
    }

    pub fn streams(&self) -> &StreamManager {
        &self.streams
    }

    pub fn source(&self) -> &dyn SnapshotSource {
        self.source.as_ref()
    }

    pub(crate) fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    // ── Wallet lifecycle ─────────────────────────────────────────────────

    /// Connect a wallet and optionally select its active subaccount.
    /// Switching to a different wallet drops everything tied to the old one.
    pub fn connect_wallet(&self, address: impl Into<String>, subaccount_id: Option<SubaccountId>) {
        let address = address.into();
        let switched = self
            .session
            .address()
            .is_some_and(|current| current != address);
        self.session.connect(address);
        if switched {
            self.clear_caches();
            self.streams.cancel_all();
        }
        self.select_subaccount(subaccount_id);
    }

    /// Switch the active subaccount. When it actually changes, the caches
    /// are cleared and every subaccount-scoped stream is cancelled.
    ///
    /// The session is updated first and streams are cancelled last, so a
    /// resync racing with the switch never outlives it.
    pub fn select_subaccount(&self, subaccount_id: Option<SubaccountId>) {
        if self.session.subaccount_id() == subaccount_id {
            return;
        }
        self.session.select_subaccount(subaccount_id);
        self.clear_caches();
        for kind in self.streams.kinds() {
            if kind.is_subaccount_scoped() {
                self.streams.cancel_if_exists(kind);
            }
        }
    }

    /// Full disconnect: end the session, drop cached data, cancel every stream.
    pub fn disconnect_wallet(&self) {
        self.session.disconnect();
        self.clear_caches();
        self.streams.cancel_all();
    }

    pub fn clear_caches(&self) {
        self.positions.write().clear();
        self.balances.write().clear();
        self.orders.write().clear();
    }

    // ── Streams ──────────────────────────────────────────────────────────

    /// Callback that merges updates for `subaccount_id` into the matching store.
    pub fn update_callback(&self, subaccount_id: Option<SubaccountId>) -> StreamCallback {
        let positions = self.positions.clone();
        let balances = self.balances.clone();
        let orders = self.orders.clone();

        Arc::new(move |update: StreamUpdate| {
            if let Some(expected) = &subaccount_id {
                if update.subaccount_id() != expected {
                    tracing::debug!(
                        got = %update.subaccount_id(),
                        expected = %expected,
                        "Dropping update for another subaccount"
                    );
                    return;
                }
            }
            match update {
                StreamUpdate::Position(p) => positions.write().upsert(p),
                StreamUpdate::Balance(b) => balances.write().upsert(b),
                StreamUpdate::Order(o) => orders.write().upsert(o),
            }
        })
    }

    /// (Re)start the stream for `kind`, scoped to the active subaccount and
    /// an optional market. Any existing stream of that kind is cancelled first.
    pub fn start_stream(
        &self,
        kind: StreamKind,
        market_id: Option<MarketId>,
    ) -> Result<StreamHandle, SdkError> {
        let subaccount_id = self.session.subaccount_id();
        if kind.is_subaccount_scoped() && subaccount_id.is_none() {
            return Err(SdkError::Validation(format!(
                "{} stream requires an active subaccount",
                kind
            )));
        }
        self.streams.cancel_if_exists(kind);
        self.open_stream(kind, market_id, subaccount_id)
    }

    /// Cancel the stream for `kind`, if any.
    pub fn stop_stream(&self, kind: StreamKind) -> bool {
        self.streams.cancel_if_exists(kind)
    }

    /// Open and register a stream without cancelling the previous one.
    pub(crate) fn open_stream(
        &self,
        kind: StreamKind,
        market_id: Option<MarketId>,
        subaccount_id: Option<SubaccountId>,
    ) -> Result<StreamHandle, SdkError> {
        let mut params = StreamParams::new(kind).market(market_id);
        params.subaccount_id = subaccount_id.clone();

        let handle = self
            .opener
            .open(params, self.update_callback(subaccount_id))?;
        self.streams.set(handle.clone(), kind);
        tracing::debug!(kind = %kind, handle = %handle.id(), "Stream opened");
        Ok(handle)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("connected", &self.session.is_connected())
            .field("subaccount_id", &self.session.subaccount_id())
            .field("positions", &self.positions.read().len())
            .field("balances", &self.balances.read().len())
            .field("orders", &self.orders.read().len())
            .field("streams", &self.streams.kinds())
            .finish()
    }
}
