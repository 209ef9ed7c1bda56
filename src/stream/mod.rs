//! Streaming layer: stream kinds, handles, the handle registry, and the
//! wire messages spoken by the indexer stream endpoint.
//!
//! The transport is abstracted behind [`StreamOpener`]. With the `ws-native`
//! feature, [`native::WsStreamOpener`] provides a `tokio-tungstenite`
//! implementation.

pub mod handle;
pub mod manager;

#[cfg(feature = "ws-native")]
pub mod native;

use crate::domain::balance::{wire::BalanceWire, Balance};
use crate::domain::order::{wire::OrderWire, Order};
use crate::domain::position::{wire::PositionWire, Position};
use crate::error::StreamError;
use crate::shared::{MarketId, SubaccountId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use handle::StreamHandle;
pub use manager::StreamManager;

// ─── StreamKind ──────────────────────────────────────────────────────────────

/// Classification tag of a live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    SubaccountPositions,
    SubaccountBalances,
    SubaccountOrders,
    Orderbook,
    Trades,
    Markets,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::SubaccountPositions => "subaccount_positions",
            StreamKind::SubaccountBalances => "subaccount_balances",
            StreamKind::SubaccountOrders => "subaccount_orders",
            StreamKind::Orderbook => "orderbook",
            StreamKind::Trades => "trades",
            StreamKind::Markets => "markets",
        }
    }

    /// Streams that are scoped to a subaccount and must not outlive the session.
    pub fn is_subaccount_scoped(&self) -> bool {
        matches!(
            self,
            StreamKind::SubaccountPositions
                | StreamKind::SubaccountBalances
                | StreamKind::SubaccountOrders
        )
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Subscription parameters ─────────────────────────────────────────────────

/// Scope of a stream: kind plus subaccount and market filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamParams {
    #[serde(rename = "stream")]
    pub kind: StreamKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subaccount_id: Option<SubaccountId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub market_id: Option<MarketId>,
}

impl StreamParams {
    pub fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            subaccount_id: None,
            market_id: None,
        }
    }

    pub fn subaccount(mut self, subaccount_id: SubaccountId) -> Self {
        self.subaccount_id = Some(subaccount_id);
        self
    }

    pub fn market(mut self, market_id: Option<MarketId>) -> Self {
        self.market_id = market_id;
        self
    }
}

// ─── Updates delivered to consumers ──────────────────────────────────────────

/// A parsed push update.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Position(Position),
    Balance(Balance),
    Order(Order),
}

impl StreamUpdate {
    /// The stream kind that delivers this update.
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamUpdate::Position(_) => StreamKind::SubaccountPositions,
            StreamUpdate::Balance(_) => StreamKind::SubaccountBalances,
            StreamUpdate::Order(_) => StreamKind::SubaccountOrders,
        }
    }

    pub fn subaccount_id(&self) -> &SubaccountId {
        match self {
            StreamUpdate::Position(p) => &p.subaccount_id,
            StreamUpdate::Balance(b) => &b.subaccount_id,
            StreamUpdate::Order(o) => &o.subaccount_id,
        }
    }
}

/// Callback invoked for every update until the stream is cancelled.
pub type StreamCallback = Arc<dyn Fn(StreamUpdate) + Send + Sync>;

/// The streaming subscription interface.
///
/// `open` must not block: implementations spawn whatever background work
/// they need and hand back a handle whose cancellation stops delivery.
pub trait StreamOpener: Send + Sync {
    fn open(&self, params: StreamParams, callback: StreamCallback)
        -> Result<StreamHandle, StreamError>;
}

// ─── Wire messages ───────────────────────────────────────────────────────────

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MessageOut {
    #[serde(rename = "subscribe")]
    Subscribe { params: StreamParams },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { params: StreamParams },
    #[serde(rename = "ping")]
    Ping,
}

/// Inbound message from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum MessageIn {
    #[serde(rename = "position")]
    Position { data: PositionWire },
    #[serde(rename = "balance")]
    Balance { data: BalanceWire },
    #[serde(rename = "order")]
    Order { data: OrderWire },
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(default)]
        code: Option<String>,
    },
}

impl MessageIn {
    /// Convert a data message into a domain update; control messages yield `None`.
    pub fn into_update(self) -> Option<StreamUpdate> {
        match self {
            MessageIn::Position { data } => Some(StreamUpdate::Position(data.into())),
            MessageIn::Balance { data } => Some(StreamUpdate::Balance(data.into())),
            MessageIn::Order { data } => Some(StreamUpdate::Order(data.into())),
            MessageIn::Pong | MessageIn::Error { .. } => None,
        }
    }
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Configuration for stream connections.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub url: String,
    pub reconnect: bool,
    pub max_reconnect_attempts: u32,
    pub base_reconnect_delay_ms: u32,
    pub ping_interval_ms: u32,
    pub pong_timeout_ms: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_STREAM_URL.to_string(),
            reconnect: true,
            max_reconnect_attempts: 10,
            base_reconnect_delay_ms: 1000,
            ping_interval_ms: 30_000,
            pong_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_wire_format() {
        let params = StreamParams::new(StreamKind::SubaccountPositions)
            .subaccount(SubaccountId::new("0xsub"))
            .market(Some(MarketId::new("0xmkt")));
        let json = serde_json::to_value(MessageOut::Subscribe { params }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "subscribe",
                "params": {
                    "stream": "subaccount_positions",
                    "subaccount_id": "0xsub",
                    "market_id": "0xmkt"
                }
            })
        );
    }

    #[test]
    fn test_unscoped_params_omit_filters() {
        let json = serde_json::to_value(MessageOut::Unsubscribe {
            params: StreamParams::new(StreamKind::Orderbook),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "unsubscribe", "params": {"stream": "orderbook"}})
        );
        assert_eq!(
            serde_json::to_value(MessageOut::Ping).unwrap(),
            serde_json::json!({"type": "ping"})
        );
    }

    #[test]
    fn test_kind_names_match_serde() {
        for kind in [
            StreamKind::SubaccountPositions,
            StreamKind::SubaccountBalances,
            StreamKind::SubaccountOrders,
            StreamKind::Orderbook,
            StreamKind::Trades,
            StreamKind::Markets,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!(StreamKind::SubaccountOrders.is_subaccount_scoped());
        assert!(!StreamKind::Orderbook.is_subaccount_scoped());
    }

    #[test]
    fn test_inbound_position_into_update() {
        let raw = r#"{
            "type": "position",
            "data": {
                "subaccountId": "0xsub",
                "marketId": "0xmkt",
                "direction": "long",
                "quantity": "1",
                "entryPrice": "10",
                "margin": "5",
                "updatedAt": 100
            }
        }"#;
        let msg: MessageIn = serde_json::from_str(raw).unwrap();
        let update = msg.into_update().unwrap();
        assert_eq!(update.kind(), StreamKind::SubaccountPositions);
        match update {
            StreamUpdate::Position(p) => assert_eq!(p.market_id.as_str(), "0xmkt"),
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn test_inbound_control_messages() {
        let pong: MessageIn = serde_json::from_str(r#"{"type":"pong"}"#).unwrap();
        assert!(pong.into_update().is_none());
        let err: MessageIn =
            serde_json::from_str(r#"{"type":"error","message":"bad scope"}"#).unwrap();
        match err {
            MessageIn::Error { message, code } => {
                assert_eq!(message, "bad scope");
                assert!(code.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
