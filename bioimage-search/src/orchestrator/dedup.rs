//! Order-preserving merge of result sets from several archive calls.
//!
//! Two results are the same study when they share an accession; failing
//! that, a study URL; failing that, a title. Comparison ignores case and
//! surrounding whitespace. A result with none of the three is always kept.

use std::collections::HashSet;

use crate::types::DatasetRecord;

/// Identity of a result for merging purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Accession(String),
    Url(String),
    Title(String),
    /// Never equal to the key of any other item.
    Unique(usize),
}

/// Fields a result exposes for deduplication.
pub trait MergeKey {
    fn accession(&self) -> &str;
    fn url(&self) -> Option<&str>;
    fn title(&self) -> &str;
}

impl MergeKey for DatasetRecord {
    fn accession(&self) -> &str {
        &self.accession
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn title(&self) -> &str {
        &self.title
    }
}

fn normalised(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Compute the dedup key of `item`; `ordinal` feeds the unique fallback.
pub fn dedup_key<T: MergeKey>(item: &T, ordinal: usize) -> DedupKey {
    if let Some(accession) = normalised(item.accession()) {
        return DedupKey::Accession(accession);
    }
    if let Some(url) = item.url().and_then(normalised) {
        return DedupKey::Url(url);
    }
    if let Some(title) = normalised(item.title()) {
        return DedupKey::Title(title);
    }
    DedupKey::Unique(ordinal)
}

/// Merge `secondary` into `primary`, keeping the first occurrence of each key.
///
/// Duplicates inside `primary` itself are collapsed too, so the output
/// never holds two items with the same key.
pub fn merge_unique<T: MergeKey>(primary: Vec<T>, secondary: Vec<T>) -> Vec<T> {
    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut merged: Vec<T> = Vec::with_capacity(primary.len() + secondary.len());
    for (ordinal, candidate) in primary.into_iter().chain(secondary).enumerate() {
        if seen.insert(dedup_key(&candidate, ordinal)) {
            merged.push(candidate);
        }
    }
    merged
}
