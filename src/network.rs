//! Network URL constants.

/// Default indexer REST API base URL.
pub const DEFAULT_API_URL: &str = "https://indexer.dex-api.network";

/// Default indexer stream (WebSocket) URL.
pub const DEFAULT_STREAM_URL: &str = "wss://indexer.dex-api.network/stream";
