//! Query handling: URL construction, tokenisation, and fallback terms.
//!
//! The archive accepts a free-text `query` parameter that understands
//! boolean operators, quoted phrases, and wildcards. [`build_url`] keeps
//! that syntax readable on the wire; [`query_terms`] and
//! [`fallback_candidate_terms`] derive the simpler terms the orchestrator
//! falls back to when a query is too specific for the index.

use std::sync::LazyLock;

use regex::Regex;

/// Characters left unescaped so query syntax survives transport.
const SAFE_CHARS: &str = "\"()[]{}:*?+-/\\";

/// Words that carry no search meaning in natural-language requests.
const STOPWORDS: &[&str] = &[
    "and", "or", "not", "the", "a", "an", "of", "for", "with", "in", "on", "to", "please", "give",
    "me", "find", "show", "get", "dataset", "datasets",
];

/// Shortest token kept by [`query_terms`].
const MIN_TERM_LEN: usize = 3;

/// Characters stripped from the ends of a boolean clause.
const CLAUSE_QUOTES: &[char] = &['"', '\'', '(', ')', '[', ']', '{', '}'];

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("Invalid token regex pattern"));

static BOOLEAN_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAND\b|\bOR\b").expect("Invalid boolean operator regex pattern")
});

/// Build the full search URL for `query` against `base_url`.
///
/// Everything except ASCII alphanumerics, `_.-~`, and the query-syntax
/// characters `"()[]{}:*?+-/\` is percent-encoded.
pub fn build_url(base_url: &str, query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    let mut buf = [0u8; 4];
    for ch in query.chars() {
        if SAFE_CHARS.contains(ch) {
            encoded.push(ch);
        } else {
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    format!("{base_url}?query={encoded}")
}

/// Significant lowercase terms of `query`, in first-seen order.
///
/// Tokens are runs of ASCII letters and digits at least three characters
/// long; stopwords and repeats are dropped.
pub fn query_terms(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut terms: Vec<String> = Vec::new();
    for token in TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()) {
        if token.len() < MIN_TERM_LEN || STOPWORDS.contains(&token) {
            continue;
        }
        if !terms.iter().any(|t| t == token) {
            terms.push(token.to_string());
        }
    }
    terms
}

/// Split `query` on `AND` / `OR` and strip quoting from each clause.
///
/// Clauses shorter than two characters or consisting only of an operator
/// are dropped. Case of the remaining text is preserved.
pub fn boolean_clauses(query: &str) -> Vec<String> {
    let mut clauses: Vec<String> = Vec::new();
    for part in BOOLEAN_SPLIT_RE.split(query) {
        let candidate = part.trim().trim_matches(CLAUSE_QUOTES).trim();
        if candidate.chars().count() < 2 {
            continue;
        }
        if matches!(candidate.to_lowercase().as_str(), "and" | "or" | "not") {
            continue;
        }
        if !clauses.iter().any(|c| c == candidate) {
            clauses.push(candidate.to_string());
        }
    }
    clauses
}

/// Alternative queries to try when `query` is empty-handed or weak.
///
/// Boolean clauses come first, then individual terms from
/// [`query_terms`]. A candidate identical to the trimmed original query is
/// skipped since it would only repeat the primary call. At most `max`
/// candidates are returned.
pub fn fallback_candidate_terms(query: &str, max: usize) -> Vec<String> {
    let original = query.trim();
    let mut candidates: Vec<String> = Vec::new();
    for term in boolean_clauses(query).into_iter().chain(query_terms(query)) {
        if term == original || candidates.contains(&term) {
            continue;
        }
        candidates.push(term);
    }
    candidates.truncate(max);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://archive.example/fts";

    #[test]
    fn build_url_encodes_spaces() {
        assert_eq!(
            build_url(BASE, "mouse tumor"),
            "https://archive.example/fts?query=mouse%20tumor"
        );
    }

    #[test]
    fn build_url_keeps_query_syntax() {
        assert_eq!(
            build_url(BASE, "\"cell*\" AND (a-b/c)"),
            "https://archive.example/fts?query=\"cell*\"%20AND%20(a-b/c)"
        );
        assert_eq!(
            build_url(BASE, "x:y?+[z]{w}\\"),
            "https://archive.example/fts?query=x:y?+[z]{w}\\"
        );
    }

    #[test]
    fn build_url_encodes_reserved_and_unicode() {
        assert_eq!(
            build_url(BASE, "a&b=c#d"),
            "https://archive.example/fts?query=a%26b%3Dc%23d"
        );
        assert_eq!(build_url(BASE, "é"), "https://archive.example/fts?query=%C3%A9");
    }

    #[test]
    fn build_url_empty_query() {
        assert_eq!(build_url(BASE, ""), "https://archive.example/fts?query=");
    }

    #[test]
    fn query_terms_drops_stopwords_and_short_tokens() {
        assert_eq!(
            query_terms("Please find me the datasets of Mouse tumor in 3D"),
            vec!["mouse", "tumor"]
        );
    }

    #[test]
    fn query_terms_dedupes_preserving_order() {
        assert_eq!(
            query_terms("tumor MOUSE tumor mouse-cell"),
            vec!["tumor", "mouse", "cell"]
        );
    }

    #[test]
    fn query_terms_empty_query() {
        assert!(query_terms("").is_empty());
        assert!(query_terms("a an of").is_empty());
    }

    #[test]
    fn query_terms_splits_on_punctuation() {
        assert_eq!(query_terms("hela_cells,u2os"), vec!["hela", "cells", "u2os"]);
    }

    #[test]
    fn boolean_clauses_split_on_operators() {
        assert_eq!(
            boolean_clauses("\"mouse brain\" AND (tumor OR cancer)"),
            vec!["mouse brain", "tumor", "cancer"]
        );
    }

    #[test]
    fn boolean_clauses_case_insensitive_whole_words() {
        assert_eq!(boolean_clauses("organoid and zebrafish"), vec!["organoid", "zebrafish"]);
        assert_eq!(boolean_clauses("cortex"), vec!["cortex"]);
    }

    #[test]
    fn boolean_clauses_drop_short_and_operator_parts() {
        assert_eq!(boolean_clauses("x OR NOT OR tumor"), vec!["tumor"]);
    }

    #[test]
    fn fallback_candidates_skip_original_query() {
        assert_eq!(
            fallback_candidate_terms("mouse tumor", 4),
            vec!["mouse", "tumor"]
        );
    }

    #[test]
    fn fallback_candidates_clauses_then_terms() {
        assert_eq!(
            fallback_candidate_terms("Mouse AND tumor cells", 4),
            vec!["Mouse", "tumor cells", "mouse", "tumor"]
        );
    }

    #[test]
    fn fallback_candidates_capped() {
        let candidates = fallback_candidate_terms("alpha beta gamma delta epsilon", 4);
        assert_eq!(candidates, vec!["alpha", "beta", "gamma", "delta"]);
        assert!(fallback_candidate_terms("alpha beta", 0).is_empty());
    }

    #[test]
    fn fallback_candidates_single_term_query() {
        assert!(fallback_candidate_terms("cancer", 4).is_empty());
        assert!(fallback_candidate_terms("", 4).is_empty());
    }
}
