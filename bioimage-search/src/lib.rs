//! # bioimage-search
//!
//! Relevance-aware search over the BioImage Archive full-text index.
//!
//! The archive's beta search is sparse and often literal: multi-word
//! queries can return nothing, or return studies that only match one word.
//! This crate sits between a caller (typically an assistant) and the
//! archive and works around both problems.
//!
//! ## Design
//!
//! - Raw payloads come from a [`Transport`]: direct HTTPS with bounded
//!   retries, or a [`HostBridge`] supplied by the embedding host
//! - Both known payload shapes are normalised into one list of hits
//! - Hits are mapped into canonical records by first-non-empty field lookup
//! - Dataset results are reranked by a deterministic lexical score
//! - Weak matches trigger enrichment queries; empty results trigger a
//!   fallback cascade over simpler sub-queries
//! - Results from several calls are merged without duplicates
//!
//! ## Logging
//!
//! Query text is only logged at debug level. Transport failures are logged
//! at warn level with the attempt number.

pub mod config;
pub mod error;
pub mod http;
pub mod mapper;
pub mod orchestrator;
pub mod payload;
pub mod query;
pub mod summary;
pub mod transport;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use orchestrator::search::ArchiveSearch;
pub use summary::{explain_advanced_query_syntax, format_dataset_summary, probe_index};
pub use transport::{BridgeReply, BridgeTransport, HostBridge, HttpTransport, Transport};
pub use types::{CompactResult, SearchKind, SearchResponse};

/// Search the archive over direct HTTP.
///
/// Builds an [`ArchiveSearch`] from `config` for this one call. Callers
/// issuing many searches should construct an [`ArchiveSearch`] once and
/// reuse it.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid, otherwise as
/// [`ArchiveSearch::search`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> bioimage_search::Result<()> {
/// use bioimage_search::{SearchConfig, SearchKind};
///
/// let config = SearchConfig::default();
/// let response = bioimage_search::search(SearchKind::Datasets, "mouse tumor", 5, &config).await?;
/// for result in &response.results {
///     println!("{} {}", result.accession(), result.title());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    kind: SearchKind,
    query: &str,
    limit: usize,
    config: &SearchConfig,
) -> Result<SearchResponse> {
    ArchiveSearch::from_config(config.clone())?
        .search(kind, query, limit)
        .await
}

/// Dataset search with the default configuration.
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_datasets(query: &str, limit: usize) -> Result<SearchResponse> {
    search(SearchKind::Datasets, query, limit, &SearchConfig::default()).await
}

/// Image search with the default configuration.
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_images(query: &str, limit: usize) -> Result<SearchResponse> {
    search(SearchKind::Images, query, limit, &SearchConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_zero_max_results() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let result = search(SearchKind::Datasets, "test", 3, &config).await;
        assert!(result.unwrap_err().to_string().contains("max_results"));
    }

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = search(SearchKind::Images, "test", 3, &config).await;
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_validates_config_bad_url() {
        let config = SearchConfig {
            dataset_search_url: "ftp://archive.example/fts".into(),
            ..Default::default()
        };
        let result = search(SearchKind::Datasets, "test", 3, &config).await;
        assert!(matches!(result, Err(SearchError::Config(_))));
    }
}
