//! Core types: result kinds, canonical records, and caller-facing responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Maximum characters kept in a compact title.
pub const MAX_TITLE_CHARS: usize = 180;

/// Title used when a hit carries no usable name or identifier.
pub const UNTITLED: &str = "Untitled";

/// Which archive index a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Study-level datasets.
    Datasets,
    /// Individual images.
    Images,
}

impl SearchKind {
    /// Returns the wire name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Datasets => "datasets",
            Self::Images => "images",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "datasets" => Ok(Self::Datasets),
            "images" => Ok(Self::Images),
            other => Err(SearchError::Config(format!(
                "unknown search kind '{other}', expected 'datasets' or 'images'"
            ))),
        }
    }
}

/// A dataset hit after field resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Display title; never empty.
    pub title: String,
    /// Study accession, empty when unknown.
    pub accession: String,
    /// Study page URL, present only when the accession is known.
    pub url: Option<String>,
    pub uuid: Option<String>,
    pub description: Option<String>,
    pub doi: Option<String>,
    pub release_date: Option<String>,
    /// Relevance score reported by the archive itself.
    pub score: Option<f64>,
}

/// An image hit after field resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Image UUID or raw hit id, empty when unknown.
    pub id: String,
    pub accession: String,
    /// Display title; never empty.
    pub title: String,
    pub study_url: Option<String>,
    pub dataset_uuid: Option<String>,
    pub file_pattern: Option<String>,
    pub acquisition_title: Option<String>,
    pub score: Option<f64>,
}

/// A raw hit mapped into one of the two canonical shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CanonicalResult {
    Dataset(DatasetRecord),
    Image(ImageRecord),
}

impl CanonicalResult {
    /// Display title of either record kind.
    pub fn title(&self) -> &str {
        match self {
            Self::Dataset(record) => &record.title,
            Self::Image(record) => &record.title,
        }
    }

    /// Project into the caller-facing shape.
    pub fn compact(&self) -> CompactResult {
        match self {
            Self::Dataset(record) => CompactResult::Dataset(CompactDataset::from(record)),
            Self::Image(record) => CompactResult::Image(CompactImage::from(record)),
        }
    }
}

/// Caller-facing projection of a [`DatasetRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompactDataset {
    pub title: String,
    pub accession: String,
    pub url: Option<String>,
    pub doi: Option<String>,
    pub release_date: Option<String>,
    pub score: Option<f64>,
}

impl From<&DatasetRecord> for CompactDataset {
    fn from(record: &DatasetRecord) -> Self {
        Self {
            title: compact_title(&record.title),
            accession: record.accession.clone(),
            url: record.url.clone(),
            doi: record.doi.clone(),
            release_date: record.release_date.clone(),
            score: record.score,
        }
    }
}

/// Caller-facing projection of an [`ImageRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompactImage {
    pub title: String,
    pub id: String,
    pub accession: String,
    pub study_url: Option<String>,
    pub file_pattern: Option<String>,
    pub score: Option<f64>,
}

impl From<&ImageRecord> for CompactImage {
    fn from(record: &ImageRecord) -> Self {
        Self {
            title: compact_title(&record.title),
            id: record.id.clone(),
            accession: record.accession.clone(),
            study_url: record.study_url.clone(),
            file_pattern: record.file_pattern.clone(),
            score: record.score,
        }
    }
}

/// The only result shape ever returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompactResult {
    Dataset(CompactDataset),
    Image(CompactImage),
}

impl CompactResult {
    /// Display title, never empty.
    pub fn title(&self) -> &str {
        match self {
            Self::Dataset(item) => &item.title,
            Self::Image(item) => &item.title,
        }
    }

    /// Study accession, empty when unknown.
    pub fn accession(&self) -> &str {
        match self {
            Self::Dataset(item) => &item.accession,
            Self::Image(item) => &item.accession,
        }
    }

    /// Study link, whichever field the kind stores it in.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Dataset(item) => item.url.as_deref(),
            Self::Image(item) => item.study_url.as_deref(),
        }
    }

    /// Relevance score reported by the archive.
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Dataset(item) => item.score,
            Self::Image(item) => item.score,
        }
    }
}

/// Outcome of one orchestrated search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query exactly as the caller issued it.
    pub query: String,
    /// The archive URL for the caller's query.
    pub url: String,
    /// Hit count reported by the archive, or merged count after a fallback cascade.
    pub total: u64,
    pub results: Vec<CompactResult>,
    /// Enrichment term that produced a strong match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_with_query: Option<String>,
    /// Set when results come from a fallback cascade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from_query: Option<String>,
    /// Fallback terms that returned at least one result, in issue order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_terms_used: Option<Vec<String>>,
}

/// Truncate to `max_len` characters, marking the cut with `...`.
pub fn short_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn compact_title(title: &str) -> String {
    if title.trim().is_empty() {
        return UNTITLED.to_string();
    }
    short_text(title, MAX_TITLE_CHARS)
}
