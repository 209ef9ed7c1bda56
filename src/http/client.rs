//! Low-level HTTP client: `IndexerHttp`.
//!
//! One method per indexer endpoint. Returns wire types; conversion to domain
//! types happens in the sub-clients.

use crate::domain::balance::wire::BalancesResponse;
use crate::domain::order::wire::OrdersResponse;
use crate::domain::position::wire::PositionsResponse;
use crate::error::HttpError;
use crate::http::retry::{parse_retry_after_ms, RetryPolicy};
use crate::shared::{join_query_list, Denom, MarketId, SubaccountId};

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Low-level HTTP client for the indexer REST API.
pub struct IndexerHttp {
    base_url: String,
    client: Client,
    default_retry: RetryPolicy,
    /// Optional bearer token. Never exposed publicly.
    auth_token: Arc<RwLock<Option<String>>>,
}

impl IndexerHttp {
    pub fn new(base_url: &str) -> Self {
        Self::with_retry(base_url, RetryPolicy::Idempotent)
    }

    pub fn with_retry(base_url: &str, default_retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            default_retry,
            auth_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = Arc::new(RwLock::new(token));
        self
    }

    pub(crate) async fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.write().await = token;
    }

    #[cfg(test)]
    pub(crate) async fn auth_token_for_test(&self) -> Option<String> {
        self.auth_token.read().await.clone()
    }

    // ── Subaccount snapshots ─────────────────────────────────────────────

    pub async fn get_subaccount_positions(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<PositionsResponse, HttpError> {
        let url = self.subaccount_url(subaccount_id, "positions", "market_ids", market_ids);
        self.get(&url, self.default_retry.clone()).await
    }

    pub async fn get_subaccount_balances(
        &self,
        subaccount_id: &SubaccountId,
        denoms: &[Denom],
    ) -> Result<BalancesResponse, HttpError> {
        let url = self.subaccount_url(subaccount_id, "balances", "denoms", denoms);
        self.get(&url, self.default_retry.clone()).await
    }

    pub async fn get_subaccount_orders(
        &self,
        subaccount_id: &SubaccountId,
        market_ids: &[MarketId],
    ) -> Result<OrdersResponse, HttpError> {
        let url = self.subaccount_url(subaccount_id, "orders", "market_ids", market_ids);
        self.get(&url, self.default_retry.clone()).await
    }

    fn subaccount_url<T: AsRef<str>>(
        &self,
        subaccount_id: &SubaccountId,
        resource: &str,
        filter_name: &str,
        filter: &[T],
    ) -> String {
        let url = format!(
            "{}/api/v1/subaccounts/{}/{}",
            self.base_url,
            urlencoding::encode(subaccount_id.as_str()),
            resource
        );
        if filter.is_empty() {
            url
        } else {
            format!("{}?{}={}", url, filter_name, join_query_list(filter))
        }
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match retry.config() {
            Some(c) => c,
            None => return self.do_get(url).await,
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            let err = match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            if !config.should_retry(&err) {
                return Err(err);
            }
            if attempt < config.max_retries {
                let delay = config.wait_before_retry(attempt, &err);
                tracing::debug!(
                    attempt = attempt + 1,
                    max = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying request to {}",
                    url
                );
                futures_timer::Delay::new(delay).await;
            }
            last_error = Some(err);
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let mut req = self.client.get(url);

        if let Some(token) = self.auth_token.read().await.as_ref() {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_ms);
        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        Err(status_to_error(status_code, body_text, retry_after_ms))
    }
}

/// Map a non-success status to the matching [`HttpError`].
fn status_to_error(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        401 => HttpError::Unauthorized,
        404 => HttpError::NotFound(body),
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}

impl Clone for IndexerHttp {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            default_retry: self.default_retry.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}
