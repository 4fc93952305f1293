//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the archive endpoints, transport timeouts and
//! retry behaviour, and how far the orchestrator may fan out into fallback
//! queries. The defaults target the public BioImage Archive beta index.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;
use crate::types::SearchKind;

/// Full-text search endpoint for study-level datasets.
pub const DEFAULT_DATASET_SEARCH_URL: &str = "https://beta.bioimagearchive.org/search/search/fts";

/// Full-text search endpoint for individual images.
pub const DEFAULT_IMAGE_SEARCH_URL: &str =
    "https://beta.bioimagearchive.org/search/search/fts/image";

/// Prefix for human-facing study pages; the accession is appended.
pub const DEFAULT_STUDY_URL_BASE: &str = "https://beta.bioimagearchive.org/bioimage-archive/study";

/// Upper bound on direct HTTP attempts per call.
pub const MAX_ATTEMPTS_LIMIT: u32 = 3;

/// Upper bound on results returned per request.
pub const MAX_RESULTS_LIMIT: usize = 8;

/// Upper bound on enrichment / fallback sub-queries per request.
pub const MAX_FALLBACK_QUERIES_LIMIT: usize = 4;

/// Configuration for archive searches.
///
/// Use [`Default::default()`] for sensible defaults, or the `with_*`
/// setters for overrides. Every field falls back to its default when
/// missing from a deserialized config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the dataset full-text endpoint.
    pub dataset_search_url: String,
    /// Base URL of the image full-text endpoint.
    pub image_search_url: String,
    /// Base URL that study links are built from.
    pub study_url_base: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Attempts per direct HTTP call before giving up, at most [`MAX_ATTEMPTS_LIMIT`].
    pub max_attempts: u32,
    /// Linear backoff step in milliseconds. Attempt `n` waits `n * step`.
    pub retry_backoff_ms: u64,
    /// Cap on results returned to the caller, at most [`MAX_RESULTS_LIMIT`].
    pub max_results: usize,
    /// Enrichment / fallback sub-queries per request, at most
    /// [`MAX_FALLBACK_QUERIES_LIMIT`].
    pub max_fallback_queries: usize,
    /// Custom User-Agent string. If `None`, reqwest's default is used.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dataset_search_url: DEFAULT_DATASET_SEARCH_URL.to_string(),
            image_search_url: DEFAULT_IMAGE_SEARCH_URL.to_string(),
            study_url_base: DEFAULT_STUDY_URL_BASE.to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
            retry_backoff_ms: 1000,
            max_results: 8,
            max_fallback_queries: 4,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Point both search endpoints and study links at another host.
    ///
    /// Paths follow the public archive layout.
    pub fn with_archive_root(mut self, root: &str) -> Self {
        let root = root.trim_end_matches('/');
        self.dataset_search_url = format!("{root}/search/search/fts");
        self.image_search_url = format!("{root}/search/search/fts/image");
        self.study_url_base = format!("{root}/bioimage-archive/study");
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    /// Set the number of direct HTTP attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the linear backoff step in milliseconds.
    pub fn with_retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    /// Returns the search endpoint for `kind`.
    pub fn base_url(&self, kind: SearchKind) -> &str {
        match kind {
            SearchKind::Datasets => &self.dataset_search_url,
            SearchKind::Images => &self.image_search_url,
        }
    }

    /// Build the study page URL for an accession, or `None` if it is empty.
    pub fn study_url(&self, accession: &str) -> Option<String> {
        if accession.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{accession}",
            self.study_url_base.trim_end_matches('/')
        ))
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - all three URLs are absolute `http`/`https` URLs
    /// - `timeout_seconds`, `max_attempts` and `max_results` are greater than 0
    /// - `max_attempts`, `max_results` and `max_fallback_queries` stay within
    ///   [`MAX_ATTEMPTS_LIMIT`], [`MAX_RESULTS_LIMIT`] and
    ///   [`MAX_FALLBACK_QUERIES_LIMIT`]
    pub fn validate(&self) -> Result<(), SearchError> {
        for (name, value) in [
            ("dataset_search_url", &self.dataset_search_url),
            ("image_search_url", &self.image_search_url),
            ("study_url_base", &self.study_url_base),
        ] {
            let parsed = Url::parse(value)
                .map_err(|e| SearchError::Config(format!("{name} is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SearchError::Config(format!(
                    "{name} must use http or https"
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(SearchError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(SearchError::Config(format!(
                "max_attempts must be at most {MAX_ATTEMPTS_LIMIT}"
            )));
        }
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.max_results > MAX_RESULTS_LIMIT {
            return Err(SearchError::Config(format!(
                "max_results must be at most {MAX_RESULTS_LIMIT}"
            )));
        }
        if self.max_fallback_queries > MAX_FALLBACK_QUERIES_LIMIT {
            return Err(SearchError::Config(format!(
                "max_fallback_queries must be at most {MAX_FALLBACK_QUERIES_LIMIT}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_backoff_ms, 1000);
        assert_eq!(config.max_results, 8);
        assert_eq!(config.max_fallback_queries, 4);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn base_url_depends_on_kind() {
        let config = SearchConfig::default();
        assert_eq!(
            config.base_url(SearchKind::Datasets),
            DEFAULT_DATASET_SEARCH_URL
        );
        assert_eq!(config.base_url(SearchKind::Images), DEFAULT_IMAGE_SEARCH_URL);
    }

    #[test]
    fn study_url_built_from_accession() {
        let config = SearchConfig::default();
        assert_eq!(
            config.study_url("S-BIAD123").as_deref(),
            Some("https://beta.bioimagearchive.org/bioimage-archive/study/S-BIAD123")
        );
        assert!(config.study_url("").is_none());
    }

    #[test]
    fn archive_root_rewrites_all_urls() {
        let config = SearchConfig::default().with_archive_root("http://127.0.0.1:9000/");
        assert_eq!(
            config.dataset_search_url,
            "http://127.0.0.1:9000/search/search/fts"
        );
        assert_eq!(
            config.image_search_url,
            "http://127.0.0.1:9000/search/search/fts/image"
        );
        assert_eq!(
            config.study_url("S-1").as_deref(),
            Some("http://127.0.0.1:9000/bioimage-archive/study/S-1")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig::default().with_timeout_seconds(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = SearchConfig::default().with_max_attempts(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn zero_max_results_rejected() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn too_many_attempts_rejected() {
        let config = SearchConfig::default().with_max_attempts(4);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts must be at most 3"));
    }

    #[test]
    fn max_results_above_cap_rejected() {
        let config = SearchConfig {
            max_results: 20,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results must be at most 8"));
    }

    #[test]
    fn max_results_at_cap_valid() {
        let config = SearchConfig {
            max_results: MAX_RESULTS_LIMIT,
            max_fallback_queries: MAX_FALLBACK_QUERIES_LIMIT,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fallback_queries_above_cap_rejected() {
        let config = SearchConfig {
            max_fallback_queries: 10,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_fallback_queries"));
    }

    #[test]
    fn relative_url_rejected() {
        let config = SearchConfig {
            dataset_search_url: "/search/fts".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dataset_search_url"));
    }

    #[test]
    fn non_http_scheme_rejected() {
        let config = SearchConfig {
            study_url_base: "ftp://archive.example/study".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn zero_fallback_queries_valid() {
        let config = SearchConfig {
            max_fallback_queries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"timeout_seconds": 5}"#).expect("deserialize");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.dataset_search_url, DEFAULT_DATASET_SEARCH_URL);
    }
}
