//! Heuristic relevance scoring and reranking for dataset results.
//!
//! Each significant query term is looked up in the title, description,
//! and accession of a [`DatasetRecord`]:
//!
//! | Match                         | Weight |
//! |-------------------------------|--------|
//! | whole word in title           | 6.0    |
//! | substring in title            | 3.5    |
//! | whole word in description     | 3.0    |
//! | substring in description      | 1.0    |
//! | substring in accession        | 0.5    |
//!
//! Title and description matches each count as one hit. When the hit
//! count reaches `max(2, term_count)` a coverage bonus of 2.0 is added.
//! Finally the archive's own score contributes `min(score, 20) / 20`.

use regex::Regex;

use crate::query::query_terms;
use crate::types::DatasetRecord;

/// Score at or above which a result counts as a strong match.
pub const STRONG_MATCH_THRESHOLD: f64 = 6.0;

const TITLE_WORD_WEIGHT: f64 = 6.0;
const TITLE_SUBSTRING_WEIGHT: f64 = 3.5;
const DESCRIPTION_WORD_WEIGHT: f64 = 3.0;
const DESCRIPTION_SUBSTRING_WEIGHT: f64 = 1.0;
const ACCESSION_SUBSTRING_WEIGHT: f64 = 0.5;
const COVERAGE_BONUS: f64 = 2.0;
const NATIVE_SCORE_CAP: f64 = 20.0;

/// A query term with its whole-word matcher compiled once.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    word: Option<Regex>,
}

impl TermMatcher {
    /// Lowercase `term` and compile its whole-word pattern.
    pub fn new(term: &str) -> Self {
        let term = term.to_lowercase();
        let word = Regex::new(&format!(r"\b{}\b", regex::escape(&term))).ok();
        Self { term, word }
    }

    /// The lowercased term.
    pub fn term(&self) -> &str {
        &self.term
    }

    fn matches_word(&self, haystack: &str) -> bool {
        self.word.as_ref().is_some_and(|re| re.is_match(haystack))
    }

    fn matches_substring(&self, haystack: &str) -> bool {
        haystack.contains(&self.term)
    }
}

/// Compile matchers for every significant term of `query`.
pub fn matchers_for(query: &str) -> Vec<TermMatcher> {
    query_terms(query)
        .iter()
        .map(|term| TermMatcher::new(term))
        .collect()
}

/// Calculate the relevance of `record` against pre-compiled term matchers.
pub fn relevance_score(record: &DatasetRecord, matchers: &[TermMatcher]) -> f64 {
    let title = record.title.to_lowercase();
    let description = record
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let accession = record.accession.to_lowercase();

    let mut score = 0.0;
    let mut hits = 0usize;
    for matcher in matchers {
        if matcher.matches_word(&title) {
            score += TITLE_WORD_WEIGHT;
            hits += 1;
        } else if matcher.matches_substring(&title) {
            score += TITLE_SUBSTRING_WEIGHT;
            hits += 1;
        }

        if matcher.matches_word(&description) {
            score += DESCRIPTION_WORD_WEIGHT;
            hits += 1;
        } else if matcher.matches_substring(&description) {
            score += DESCRIPTION_SUBSTRING_WEIGHT;
            hits += 1;
        }

        if matcher.matches_substring(&accession) {
            score += ACCESSION_SUBSTRING_WEIGHT;
        }
    }

    if !matchers.is_empty() && hits >= matchers.len().max(2) {
        score += COVERAGE_BONUS;
    }

    if let Some(native) = record.score {
        score += native.min(NATIVE_SCORE_CAP) / NATIVE_SCORE_CAP;
    }

    score
}

/// Score `record` against the significant terms of `query`.
pub fn score_against(record: &DatasetRecord, query: &str) -> f64 {
    relevance_score(record, &matchers_for(query))
}

/// Reorder `records` by descending relevance to `query`.
///
/// The sort is stable, so equal scores keep their incoming order. A query
/// without significant terms leaves the order untouched.
pub fn rerank(records: Vec<DatasetRecord>, query: &str) -> Vec<DatasetRecord> {
    let matchers = matchers_for(query);
    if matchers.is_empty() {
        return records;
    }
    let mut scored: Vec<(f64, DatasetRecord)> = records
        .into_iter()
        .map(|record| (relevance_score(&record, &matchers), record))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, record)| record).collect()
}

/// Whether any record reaches [`STRONG_MATCH_THRESHOLD`] for `query`.
///
/// A query without significant terms is always considered matched.
pub fn has_strong_match(records: &[DatasetRecord], query: &str) -> bool {
    let matchers = matchers_for(query);
    if matchers.is_empty() {
        return true;
    }
    records
        .iter()
        .any(|record| relevance_score(record, &matchers) >= STRONG_MATCH_THRESHOLD)
}
