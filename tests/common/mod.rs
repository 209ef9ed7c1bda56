#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use subaccount_sync::prelude::*;
use tokio::sync::Notify;

pub const WALLET: &str = "0xwallet";
pub const SUB: &str = "0xwallet-sub-1";
pub const OTHER_SUB: &str = "0xwallet-sub-2";

pub fn sub() -> SubaccountId {
    SubaccountId::new(SUB)
}

pub fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap()
}

pub fn position(market: &str, updated_ms: i64) -> Position {
    Position {
        subaccount_id: sub(),
        market_id: MarketId::new(market),
        ticker: format!("{}/USDT PERP", market),
        direction: TradeDirection::Long,
        quantity: Decimal::ONE,
        entry_price: Decimal::from(100),
        margin: Decimal::from(20),
        updated_at: at(updated_ms),
    }
}

pub fn balance(denom: &str, total: i64, available: i64) -> Balance {
    Balance {
        subaccount_id: sub(),
        denom: Denom::new(denom),
        total_balance: Decimal::from(total),
        available_balance: Decimal::from(available),
        updated_at: at(1),
    }
}

pub fn order(hash: &str, market: &str, state: OrderState, updated_ms: i64) -> Order {
    Order {
        order_hash: hash.to_string(),
        subaccount_id: sub(),
        market_id: MarketId::new(market),
        side: OrderSide::Sell,
        price: Decimal::from(50),
        quantity: Decimal::from(3),
        unfilled_quantity: if state.is_open() { Decimal::from(3) } else { Decimal::ZERO },
        state,
        created_at: at(1),
        updated_at: at(updated_ms),
    }
}

// ─── FakeSource ──────────────────────────────────────────────────────────────

/// In-memory snapshot source. Optionally parks every fetch on a `Notify`.
#[derive(Default)]
pub struct FakeSource {
    pub positions: Mutex<Vec<Position>>,
    pub balances: Mutex<Vec<Balance>>,
    pub orders: Mutex<Vec<Order>>,
    pub fail_with: Mutex<Option<String>>,
    pub last_filter: Mutex<Vec<String>>,
    fetches: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_positions(&self, positions: Vec<Position>) {
        *self.positions.lock() = positions;
    }

    pub fn set_balances(&self, balances: Vec<Balance>) {
        *self.balances.lock() = balances;
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.lock() = orders;
    }

    pub fn fail(&self, message: Option<&str>) {
        *self.fail_with.lock() = message.map(str::to_string);
    }

    async fn enter<T: AsRef<str>>(&self, filter: &[T]) -> Result<(), SdkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock() = filter.iter().map(|f| f.as_ref().to_string()).collect();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let failure = self.fail_with.lock().clone();
        match failure {
            Some(message) => Err(SdkError::Other(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn fetch_positions(
        &self,
        _subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Position>, SdkError> {
        self.enter(market_ids).await?;
        Ok(self.positions.lock().clone())
    }

    async fn fetch_balances(
        &self,
        _subaccount_id: &SubaccountId,
        denoms: &[Denom],
    ) -> Result<Vec<Balance>, SdkError> {
        self.enter(denoms).await?;
        Ok(self.balances.lock().clone())
    }

    async fn fetch_orders(
        &self,
        _subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Order>, SdkError> {
        self.enter(market_ids).await?;
        Ok(self.orders.lock().clone())
    }
}

// ─── RecordingOpener ─────────────────────────────────────────────────────────

pub struct Opened {
    pub params: StreamParams,
    pub callback: StreamCallback,
    pub handle: StreamHandle,
}

/// Stream opener that records every request and hands back detached handles.
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<Opened>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.opened.lock().len()
    }

    pub fn params(&self, index: usize) -> StreamParams {
        self.opened.lock()[index].params.clone()
    }

    pub fn last_params(&self) -> Option<StreamParams> {
        self.opened.lock().last().map(|o| o.params.clone())
    }

    pub fn handle(&self, index: usize) -> StreamHandle {
        self.opened.lock()[index].handle.clone()
    }

    /// Deliver `update` through the callback of the `index`-th opened stream.
    pub fn push(&self, index: usize, update: StreamUpdate) {
        let callback = self.opened.lock()[index].callback.clone();
        callback(update);
    }
}

impl StreamOpener for RecordingOpener {
    fn open(
        &self,
        params: StreamParams,
        callback: StreamCallback,
    ) -> Result<StreamHandle, StreamError> {
        let handle = StreamHandle::detached(params.kind);
        self.opened.lock().push(Opened {
            params,
            callback,
            handle: handle.clone(),
        });
        Ok(handle)
    }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub opener: Arc<RecordingOpener>,
    pub ctx: Arc<AppContext>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_source(FakeSource::new())
    }

    pub fn with_source(source: FakeSource) -> Self {
        let source = Arc::new(source);
        let opener = Arc::new(RecordingOpener::new());
        let ctx = Arc::new(AppContext::new(source.clone(), opener.clone()));
        Self { source, opener, ctx }
    }

    /// Connect the test wallet with the default subaccount selected.
    pub fn connected() -> Self {
        let h = Self::new();
        h.ctx.connect_wallet(WALLET, Some(sub()));
        h
    }
}
