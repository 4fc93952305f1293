//! Transports that fetch raw search payloads from the archive.
//!
//! The orchestrator only sees the [`Transport`] trait. Two implementations
//! exist and one is chosen when an [`ArchiveSearch`](crate::ArchiveSearch)
//! is constructed:
//!
//! - [`HttpTransport`] issues direct GET requests with bounded retries and
//!   linear backoff.
//! - [`BridgeTransport`] delegates to a [`HostBridge`] supplied by the host
//!   environment. Bridge errors are authoritative and never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::query::build_url;
use crate::types::SearchKind;

/// A source of raw archive payloads.
///
/// Implementations must be `Send + Sync`; one transport is shared by every
/// request an [`ArchiveSearch`](crate::ArchiveSearch) serves.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the raw payload for `query` against the `kind` index.
    ///
    /// `limit` is a hint for how many hits the caller intends to use.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when no payload could be obtained.
    async fn fetch(&self, kind: SearchKind, query: &str, limit: usize) -> Result<Value>;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Delay before retrying after failed attempt number `attempt` (1-based).
pub fn backoff_delay(step_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(step_ms.saturating_mul(u64::from(attempt)))
}

/// Direct HTTPS transport against the public search endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    config: SearchConfig,
}

impl HttpTransport {
    /// Create a transport with its own client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// One GET request, decoded as JSON.
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Http(format!(
                        "request timed out after {}s",
                        self.config.timeout_seconds
                    ))
                } else {
                    SearchError::Http(format!("request failed: {e}"))
                }
            })?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("archive returned an error status: {e}")))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::Http(format!("response was not valid JSON: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, kind: SearchKind, query: &str, _limit: usize) -> Result<Value> {
        let url = build_url(self.config.base_url(kind), query);
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            tracing::debug!(%kind, attempt, max_attempts, url = %url, "archive request");
            match self.get_json(&url).await {
                Ok(payload) => return Ok(payload),
                Err(err) => {
                    tracing::warn!(%kind, attempt, max_attempts, error = %err, "archive request failed");
                    last_error = Some(err);
                    if attempt < max_attempts {
                        let delay = backoff_delay(self.config.retry_backoff_ms, attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(SearchError::RetriesExhausted {
            attempts: max_attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| SearchError::Http("no request was made".into())),
            ),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// What a host bridge hands back for a search call.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    /// JSON text that still needs parsing.
    Text(String),
    /// An already-structured payload.
    Structured(Value),
}

/// A search capability provided by the embedding host.
///
/// The bridge receives the same `(kind, query, limit)` triple a transport
/// does and answers with a raw archive payload.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Run one search and return the raw archive payload.
    async fn call(&self, kind: SearchKind, query: &str, limit: usize) -> Result<BridgeReply>;
}

/// Transport that answers every request through a [`HostBridge`].
pub struct BridgeTransport<B> {
    bridge: B,
}

impl<B: HostBridge> BridgeTransport<B> {
    /// Wrap `bridge` as a transport.
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }
}

/// Turn a bridge reply into a payload object.
///
/// # Errors
///
/// Returns [`SearchError::Bridge`] for unparseable text, non-object
/// payloads, or payloads carrying an `error` field.
pub fn interpret_bridge_reply(reply: BridgeReply) -> Result<Value> {
    let payload = match reply {
        BridgeReply::Text(text) => serde_json::from_str::<Value>(&text)
            .map_err(|e| SearchError::Bridge(format!("bridge returned invalid JSON: {e}")))?,
        BridgeReply::Structured(value) => value,
    };

    let Some(object) = payload.as_object() else {
        return Err(SearchError::Bridge(
            "bridge returned non-object response".into(),
        ));
    };
    if let Some(error) = object.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(SearchError::Bridge(message));
    }
    Ok(payload)
}

#[async_trait]
impl<B: HostBridge> Transport for BridgeTransport<B> {
    async fn fetch(&self, kind: SearchKind, query: &str, limit: usize) -> Result<Value> {
        tracing::debug!(%kind, limit, "archive request via host bridge");
        let reply = self
            .bridge
            .call(kind, query, limit)
            .await
            .map_err(|e| match e {
                SearchError::Bridge(_) => e,
                other => SearchError::Bridge(format!("bridge search failed: {other}")),
            })?;
        interpret_bridge_reply(reply).inspect_err(|err| {
            tracing::warn!(%kind, error = %err, "host bridge reported failure");
        })
    }

    fn name(&self) -> &'static str {
        "bridge"
    }
}
