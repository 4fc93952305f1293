//! Error types for the bioimage-search crate.
//!
//! Messages are stable and safe to show to users. Malformed archive
//! payloads are not errors at all: they degrade to empty result sets.

/// Errors that can occur while searching the archive.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A single HTTP request to the archive failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Every direct HTTP attempt failed; carries the last underlying cause.
    #[error("search failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The failure of the final attempt.
        #[source]
        source: Box<SearchError>,
    },

    /// The host bridge reported an error. Never retried.
    #[error("bridge error: {0}")]
    Bridge(String),

    /// Invalid search configuration or argument.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns `true` if this error came from the host bridge.
    pub fn is_bridge(&self) -> bool {
        matches!(self, Self::Bridge(_))
    }
}

/// Convenience type alias for bioimage-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_retries_exhausted_includes_last_cause() {
        let err = SearchError::RetriesExhausted {
            attempts: 3,
            source: Box::new(SearchError::Http("status 503".into())),
        };
        assert_eq!(
            err.to_string(),
            "search failed after 3 attempts: HTTP error: status 503"
        );
    }

    #[test]
    fn retries_exhausted_exposes_source() {
        use std::error::Error;
        let err = SearchError::RetriesExhausted {
            attempts: 2,
            source: Box::new(SearchError::Http("timeout".into())),
        };
        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "HTTP error: timeout");
    }

    #[test]
    fn display_bridge() {
        let err = SearchError::Bridge("index offline".into());
        assert_eq!(err.to_string(), "bridge error: index offline");
        assert!(err.is_bridge());
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_attempts must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_attempts must be > 0");
        assert!(!err.is_bridge());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
