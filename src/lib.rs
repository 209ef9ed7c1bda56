//! # subaccount-sync
//!
//! Keeps a DEX client's cached subaccount data (positions, balances, open
//! orders) consistent with the indexer, and manages the lifecycle of the
//! live streams that feed those caches.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Newtypes, domain models, wire types and cached snapshots
//! 2. **HTTP API**: `IndexerHttp` with per-request retry policies
//! 3. **Streams**: Stream kinds, cancellable handles, the handle registry,
//!    and a `tokio-tungstenite` opener (`ws-native`)
//! 4. **Reconciliation**: `AppContext`, integrity strategies and the
//!    periodic monitor
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use subaccount_sync::prelude::*;
//!
//! let config = SyncConfig::from_env()?;
//! let client = IndexerClientBuilder::from_config(&config).build()?;
//! let opener = WsStreamOpener::new(config.stream_config());
//! let ctx = Arc::new(AppContext::new(Arc::new(client), Arc::new(opener)));
//!
//! ctx.connect_wallet("0xabc", Some(SubaccountId::new("0xabc…01")));
//! ctx.start_stream(StreamKind::SubaccountPositions, None)?;
//!
//! let outcome = IntegrityCheck::Positions(PositionIntegrity::default())
//!     .validate(&ctx)
//!     .await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and serde helpers.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, snapshots.
pub mod domain;

/// Unified error types.
pub mod error;

/// Network URL constants.
pub mod network;

/// Runtime configuration.
pub mod config;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

/// `IndexerClient`, the REST entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 3: Streams ─────────────────────────────────────────────────────────

/// Stream kinds, handles, registry and wire messages.
pub mod stream;

// ── Layer 4: Reconciliation ──────────────────────────────────────────────────

/// Wallet connection and active subaccount.
pub mod session;

/// Snapshot source abstraction.
pub mod source;

/// Explicit application context.
pub mod context;

/// Integrity strategies.
pub mod integrity;

/// Periodic integrity monitor.
#[cfg(feature = "monitor")]
pub mod monitor;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Denom, MarketId, SubaccountId};

    // Domain types
    pub use crate::domain::balance::Balance;
    pub use crate::domain::order::{Order, OrderSide, OrderState};
    pub use crate::domain::position::{Position, TradeDirection};
    pub use crate::domain::snapshot::{CachedSnapshot, SharedSnapshot, SnapshotEntity};

    // Errors
    pub use crate::error::{SdkError, StreamError};

    // Config + network
    pub use crate::config::SyncConfig;
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_STREAM_URL};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        BalancesClient, IndexerClient, IndexerClientBuilder, OrdersClient, PositionsClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // Streams
    #[cfg(feature = "ws-native")]
    pub use crate::stream::native::WsStreamOpener;
    pub use crate::stream::{
        StreamCallback, StreamConfig, StreamHandle, StreamKind, StreamManager, StreamOpener,
        StreamParams, StreamUpdate,
    };

    // Reconciliation
    pub use crate::context::AppContext;
    pub use crate::integrity::{
        BalanceIntegrity, IntegrityCheck, IntegrityStrategy, OrderIntegrity, PositionIntegrity,
        SkipReason, ValidationOutcome,
    };
    #[cfg(feature = "monitor")]
    pub use crate::monitor::{IntegrityMonitor, MonitorHandle};
    pub use crate::session::WalletSession;
    pub use crate::source::SnapshotSource;

    pub use std::sync::Arc;
}
