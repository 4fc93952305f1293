//! Shared HTTP client for archive search requests.
//!
//! Provides a configured [`reqwest::Client`] that asks for JSON, follows a
//! bounded number of redirects, and enforces the per-request timeout.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Redirect hops followed before a request is abandoned.
const MAX_REDIRECTS: usize = 10;

/// Build a [`reqwest::Client`] configured for the archive search API.
///
/// The client has:
/// - Timeout from config
/// - `Accept: application/json` on every request
/// - Redirects followed up to a fixed limit
/// - gzip decompression
/// - Custom User-Agent if configured
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
    if let Some(ref ua) = config.user_agent {
        builder = builder.user_agent(ua.clone());
    }

    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let config = SearchConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("BioImageFinder/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }
}
