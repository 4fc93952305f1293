//! Core search orchestrator: primary query, enrichment, fallback cascade.
//!
//! Every dataset search starts with a primary pass over the caller's
//! query. What happens next depends on what came back:
//!
//! ```text
//!            ┌─────────┐ total > 0, strong match or < 2 terms ┌────────┐
//!            │ PRIMARY ├─────────────────────────────────────►│ ACCEPT │
//!            └──┬───┬──┘                                      └────────┘
//!  total > 0,   │   │ total == 0
//!  weak match   │   │
//!        ┌──────▼┐ ┌▼─────────────────┐
//!        │ENRICH │ │ FALLBACK_CASCADE │
//!        └───────┘ └──────────────────┘
//! ```
//!
//! Enrichment and fallback issue their sub-queries one after another,
//! never concurrently, so merge order is deterministic and the archive
//! sees at most one request at a time per search.

use std::sync::Arc;

use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::mapper::{map_dataset_hit, map_image_hit};
use crate::payload::normalize_hits;
use crate::query::{build_url, fallback_candidate_terms, query_terms};
use crate::transport::{BridgeTransport, HostBridge, HttpTransport, Transport};
use crate::types::{
    CanonicalResult, CompactResult, DatasetRecord, ImageRecord, SearchKind, SearchResponse,
};

use super::dedup::merge_unique;
use super::scoring::{has_strong_match, rerank};

/// Lower bound on hits fetched per dataset call so reranking has candidates.
const MIN_FETCH_LIMIT: usize = 20;
/// Upper bound on hits fetched per dataset call.
const MAX_FETCH_LIMIT: usize = 60;
/// Fetch multiplier applied to the caller's limit.
const FETCH_LIMIT_FACTOR: usize = 6;
/// Queries with fewer significant terms are accepted without enrichment.
const MIN_TERMS_FOR_ENRICHMENT: usize = 2;

/// Number of raw hits requested for a dataset call with `limit`.
pub fn fetch_limit(limit: usize) -> usize {
    limit
        .saturating_mul(FETCH_LIMIT_FACTOR)
        .clamp(MIN_FETCH_LIMIT, MAX_FETCH_LIMIT)
}

/// One primary pass before any compaction.
#[derive(Debug, Clone)]
struct DatasetPass {
    url: String,
    total: u64,
    results: Vec<DatasetRecord>,
}

/// Relevance-aware search over the archive.
///
/// Holds the transport selected at construction time and the search
/// configuration. Cheap to share: clone the [`Arc`] around it or borrow it
/// from concurrent tasks.
pub struct ArchiveSearch {
    transport: Arc<dyn Transport>,
    config: SearchConfig,
}

impl std::fmt::Debug for ArchiveSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSearch")
            .field("transport", &self.transport.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ArchiveSearch {
    /// Create a search over an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`](crate::SearchError::Config) if
    /// `config` is invalid.
    pub fn new(transport: Arc<dyn Transport>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    /// Create a search that talks to the archive over direct HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`](crate::SearchError::Config) for an
    /// invalid config, or [`SearchError::Http`](crate::SearchError::Http) if
    /// the HTTP client cannot be built.
    pub fn from_config(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.clone())?;
        Self::new(Arc::new(transport), config)
    }

    /// Create a search that answers every request through a host bridge.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`](crate::SearchError::Config) if
    /// `config` is invalid.
    pub fn with_bridge<B: HostBridge + 'static>(bridge: B, config: SearchConfig) -> Result<Self> {
        Self::new(Arc::new(BridgeTransport::new(bridge)), config)
    }

    /// The validated configuration this search runs with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Name of the transport in use (`"http"` or `"bridge"`).
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Search `kind` for `query`, returning at most `min(max_results, limit)` results.
    ///
    /// `limit` is clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Propagates transport failures:
    /// [`SearchError::RetriesExhausted`](crate::SearchError::RetriesExhausted)
    /// on the HTTP path, [`SearchError::Bridge`](crate::SearchError::Bridge)
    /// on the bridge path. A failure during enrichment or fallback aborts
    /// the whole search.
    pub async fn search(&self, kind: SearchKind, query: &str, limit: usize) -> Result<SearchResponse> {
        match kind {
            SearchKind::Datasets => self.search_datasets(query, limit).await,
            SearchKind::Images => self.search_images(query, limit).await,
        }
    }

    /// Parse `kind` from its wire name, then [`search`](Self::search).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`](crate::SearchError::Config) for an
    /// unknown kind, otherwise as [`search`](Self::search).
    pub async fn search_named(&self, kind: &str, query: &str, limit: usize) -> Result<SearchResponse> {
        let kind: SearchKind = kind.parse()?;
        self.search(kind, query, limit).await
    }

    fn result_limit(&self, limit: usize) -> usize {
        limit.max(1).min(self.config.max_results)
    }

    /// Dataset search with relevance reranking and fallback.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn search_datasets(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        let safe_limit = limit.max(1);
        let result_limit = self.result_limit(safe_limit);
        tracing::debug!(query, limit = safe_limit, "dataset search primary query");

        let mut primary = self.dataset_pass(query, safe_limit).await?;

        if primary.total > 0 {
            tracing::debug!(query, total = primary.total, "dataset primary query returned hits");
            let enriched_with = if has_strong_match(&primary.results, query)
                || query_terms(query).len() < MIN_TERMS_FOR_ENRICHMENT
            {
                None
            } else {
                self.enrich(query, safe_limit, result_limit, &mut primary.results)
                    .await?
            };
            return Ok(dataset_response(query, primary, enriched_with));
        }

        let candidates = fallback_candidate_terms(query, self.config.max_fallback_queries);
        let mut merged: Vec<DatasetRecord> = Vec::new();
        let mut terms_used: Vec<String> = Vec::new();
        for term in candidates {
            tracing::debug!(term = %term, query, "dataset fallback query after empty primary");
            let pass = self.dataset_pass(&term, safe_limit).await?;
            if pass.results.is_empty() {
                continue;
            }
            tracing::debug!(term = %term, total = pass.total, "dataset fallback query returned hits");
            merged = merge_unique(merged, pass.results);
            terms_used.push(term);
        }

        if merged.is_empty() {
            tracing::debug!(query, "dataset search found no results");
            return Ok(dataset_response(query, primary, None));
        }

        let total = merged.len() as u64;
        let mut results = rerank(merged, query);
        results.truncate(result_limit);
        tracing::debug!(query, total, terms = ?terms_used, "dataset fallback cascade merged results");
        Ok(SearchResponse {
            query: query.to_string(),
            url: build_url(&self.config.dataset_search_url, query),
            total,
            results: compact_datasets(&results),
            enriched_with_query: None,
            fallback_from_query: Some(query.to_string()),
            fallback_terms_used: Some(terms_used),
        })
    }

    /// Merge results for fallback terms into `results` until one strongly matches `query`.
    ///
    /// Returns the term that produced the strong match, if any. `results`
    /// keeps everything merged so far either way.
    async fn enrich(
        &self,
        query: &str,
        safe_limit: usize,
        result_limit: usize,
        results: &mut Vec<DatasetRecord>,
    ) -> Result<Option<String>> {
        for term in fallback_candidate_terms(query, self.config.max_fallback_queries) {
            tracing::debug!(term = %term, query, "dataset enrichment query after weak primary relevance");
            let pass = self.dataset_pass(&term, safe_limit).await?;
            let merged = merge_unique(std::mem::take(results), pass.results);
            let mut reranked = rerank(merged, query);
            reranked.truncate(result_limit);
            *results = reranked;
            if has_strong_match(results, query) {
                tracing::debug!(term = %term, query, "dataset enrichment found a strong match");
                return Ok(Some(term));
            }
        }
        Ok(None)
    }

    /// Fetch, normalise, map, and rerank one dataset query.
    async fn dataset_pass(&self, query: &str, safe_limit: usize) -> Result<DatasetPass> {
        let fetch = fetch_limit(safe_limit);
        let payload = self
            .transport
            .fetch(SearchKind::Datasets, query, fetch)
            .await?;
        let (hits, total) = normalize_hits(&payload);
        let records: Vec<DatasetRecord> = object_hits(&hits, fetch)
            .map(|hit| map_dataset_hit(hit, &self.config))
            .collect();
        let mut results = rerank(records, query);
        results.truncate(self.result_limit(safe_limit));
        Ok(DatasetPass {
            url: build_url(&self.config.dataset_search_url, query),
            total,
            results,
        })
    }

    /// Image search: a single pass, no scoring and no fallback.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn search_images(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        let safe_limit = limit.max(1);
        tracing::debug!(query, limit = safe_limit, "image search");
        let payload = self
            .transport
            .fetch(SearchKind::Images, query, safe_limit)
            .await?;
        let (hits, total) = normalize_hits(&payload);
        let records: Vec<ImageRecord> = object_hits(&hits, safe_limit)
            .map(|hit| map_image_hit(hit, &self.config))
            .take(self.result_limit(safe_limit))
            .collect();
        tracing::debug!(query, total, returned = records.len(), "image search complete");
        Ok(SearchResponse {
            query: query.to_string(),
            url: build_url(&self.config.image_search_url, query),
            total,
            results: records
                .into_iter()
                .map(|record| CanonicalResult::Image(record).compact())
                .collect(),
            enriched_with_query: None,
            fallback_from_query: None,
            fallback_terms_used: None,
        })
    }
}

/// The first `limit` hits, skipping any that are not JSON objects.
fn object_hits(hits: &[Value], limit: usize) -> impl Iterator<Item = &Value> {
    hits.iter().take(limit).filter(|hit| hit.is_object())
}

fn compact_datasets(records: &[DatasetRecord]) -> Vec<CompactResult> {
    records
        .iter()
        .map(|record| CompactResult::Dataset(record.into()))
        .collect()
}

fn dataset_response(query: &str, pass: DatasetPass, enriched_with: Option<String>) -> SearchResponse {
    SearchResponse {
        query: query.to_string(),
        url: pass.url,
        total: pass.total,
        results: compact_datasets(&pass.results),
        enriched_with_query: enriched_with,
        fallback_from_query: None,
        fallback_terms_used: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_limit_bounds() {
        assert_eq!(fetch_limit(1), 20);
        assert_eq!(fetch_limit(3), 20);
        assert_eq!(fetch_limit(4), 24);
        assert_eq!(fetch_limit(10), 60);
        assert_eq!(fetch_limit(100), 60);
        assert_eq!(fetch_limit(usize::MAX), 60);
    }

    #[test]
    fn object_hits_skips_scalars_within_limit() {
        let hits = vec![
            serde_json::json!({"_id": "a"}),
            serde_json::json!(3),
            serde_json::json!({"_id": "b"}),
            serde_json::json!({"_id": "c"}),
        ];
        let picked: Vec<&Value> = object_hits(&hits, 3).collect();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[1]["_id"], "b");
    }

    #[test]
    fn archive_search_rejects_invalid_config() {
        let config = SearchConfig {
            max_attempts: 0,
            ..Default::default()
        };
        let err = ArchiveSearch::from_config(config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn archive_search_debug_names_transport() {
        let search = ArchiveSearch::from_config(SearchConfig::default()).expect("search");
        assert_eq!(search.transport_name(), "http");
        assert!(format!("{search:?}").contains("\"http\""));
    }
}
