//! High-level client: `IndexerClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder and the [`SnapshotSource`] implementation
//! that reconciliation fetches through.

use crate::config::SyncConfig;
use crate::domain::balance::client::Balances;
use crate::domain::balance::Balance;
use crate::domain::order::client::Orders;
use crate::domain::order::Order;
use crate::domain::position::client::Positions;
use crate::domain::position::Position;
use crate::error::SdkError;
use crate::http::{IndexerHttp, RetryConfig, RetryPolicy};
use crate::shared::{Denom, MarketId, SubaccountId};
use crate::source::SnapshotSource;
use async_trait::async_trait;

// Re-export sub-client types for convenience.
pub use crate::domain::balance::client::Balances as BalancesClient;
pub use crate::domain::order::client::Orders as OrdersClient;
pub use crate::domain::position::client::Positions as PositionsClient;

/// Entry point for the indexer REST API.
///
/// `client.positions()`, `client.balances()` and `client.orders()` expose the
/// per-domain queries.
#[derive(Clone)]
pub struct IndexerClient {
    pub(crate) http: IndexerHttp,
}

impl IndexerClient {
    pub fn builder() -> IndexerClientBuilder {
        IndexerClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn positions(&self) -> Positions<'_> {
        Positions { client: self }
    }

    pub fn balances(&self) -> Balances<'_> {
        Balances { client: self }
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders { client: self }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Replace (or clear) the bearer token sent with every request.
    pub async fn set_auth_token(&self, token: Option<String>) {
        self.http.set_auth_token(token).await;
    }
}

impl std::fmt::Debug for IndexerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerClient")
            .field("base_url", &self.http.base_url())
            .finish()
    }
}

#[async_trait]
impl SnapshotSource for IndexerClient {
    async fn fetch_positions(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Position>, SdkError> {
        self.positions().get(subaccount_id, market_ids).await
    }

    async fn fetch_balances(
        &self,
        subaccount_id: &SubaccountId,
        denoms: &[Denom],
    ) -> Result<Vec<Balance>, SdkError> {
        self.balances().get(subaccount_id, denoms).await
    }

    async fn fetch_orders(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<Vec<Order>, SdkError> {
        self.orders().get(subaccount_id, market_ids).await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct IndexerClientBuilder {
    base_url: String,
    retry: RetryPolicy,
    auth_token: Option<String>,
}

impl Default for IndexerClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            retry: RetryPolicy::Idempotent,
            auth_token: None,
        }
    }
}

impl IndexerClientBuilder {
    /// Builder seeded with the API URL and retry settings of `config`.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::default()
            .base_url(&config.api_url)
            .retry(RetryPolicy::Custom(config.retry.clone()))
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn retry_config(self, config: RetryConfig) -> Self {
        self.retry(RetryPolicy::Custom(config))
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<IndexerClient, SdkError> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::Validation(format!(
                "base url must be http(s), got {:?}",
                self.base_url
            )));
        }
        Ok(IndexerClient {
            http: IndexerHttp::with_retry(base_url, self.retry).with_auth_token(self.auth_token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builder_defaults() {
        let client = IndexerClient::builder().build().unwrap();
        assert_eq!(client.base_url(), crate::network::DEFAULT_API_URL);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = IndexerClient::builder()
            .base_url("http://localhost:8080/")
            .auth_token("t")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_auth_token_can_be_replaced() {
        let client = IndexerClient::builder().auth_token("first").build().unwrap();
        tokio_test::block_on(async {
            client.set_auth_token(Some("second".to_string())).await;
            assert_eq!(
                client.http.auth_token_for_test().await.as_deref(),
                Some("second")
            );
            client.set_auth_token(None).await;
            assert_eq!(client.http.auth_token_for_test().await, None);
        });
    }

    #[test]
    fn test_builder_rejects_non_http_url() {
        let err = IndexerClient::builder().base_url("ftp://x").build().unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[test]
    fn test_builder_from_config() {
        let config = SyncConfig {
            api_url: "https://indexer.example".to_string(),
            ..SyncConfig::default()
        }
        .validation_interval(Duration::from_secs(5));
        let client = IndexerClientBuilder::from_config(&config).build().unwrap();
        assert_eq!(client.base_url(), "https://indexer.example");
    }
}
