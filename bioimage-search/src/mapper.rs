//! Mapping of raw archive hits into canonical records.
//!
//! Hits arrive either flat or wrapped in `_source`, and every field has a
//! few historical spellings. Each field is resolved from an ordered list of
//! [`Candidate`] locations; the first non-empty string wins. Missing or
//! malformed structure degrades to `None` or the documented default, so
//! mapping never fails.

use serde_json::Value;

use crate::config::SearchConfig;
use crate::types::{CanonicalResult, DatasetRecord, ImageRecord, SearchKind, UNTITLED};

/// Where a candidate value lives in a raw hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// A field of the source object (`_source` or the flat hit).
    Source(&'static str),
    /// A field of the outer hit envelope, such as `_id`.
    Hit(&'static str),
}

use Candidate::{Hit, Source};

const DATASET_ACCESSION: &[Candidate] = &[
    Source("accession_id"),
    Source("accession"),
    Source("id"),
    Hit("_id"),
];
const DATASET_TITLE: &[Candidate] = &[Source("title"), Source("name"), Source("dataset")];
const DATASET_TITLE_TAIL: &[Candidate] = &[Source("uuid"), Hit("_id")];

const IMAGE_ACCESSION: &[Candidate] = &[
    Source("accession_id"),
    Source("accession"),
    Source("study_accession"),
];
const IMAGE_ID: &[Candidate] = &[Source("uuid"), Hit("_id")];
const IMAGE_TITLE: &[Candidate] = &[Source("title"), Source("name"), Source("label")];

/// First candidate that is a string with non-blank content, trimmed.
pub fn first_non_empty<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Read-only view over a raw hit and its source object.
#[derive(Debug, Clone, Copy)]
pub struct HitView<'a> {
    hit: &'a Value,
    source: &'a Value,
}

impl<'a> HitView<'a> {
    /// View `hit`, reading fields from `_source` when it is an object.
    pub fn new(hit: &'a Value) -> Self {
        let source = hit
            .get("_source")
            .filter(|source| source.is_object())
            .unwrap_or(hit);
        Self { hit, source }
    }

    /// String value at `candidate`, if present and a string.
    pub fn lookup(&self, candidate: Candidate) -> Option<&'a str> {
        let value = match candidate {
            Source(name) => self.source.get(name),
            Hit(name) => self.hit.get(name),
        };
        value.and_then(Value::as_str)
    }

    /// Lookups for every candidate, in order.
    pub fn lookups<'c>(
        &self,
        candidates: &'c [Candidate],
    ) -> impl Iterator<Item = Option<&'a str>> + 'c
    where
        'a: 'c,
    {
        let view = *self;
        candidates.iter().map(move |c| view.lookup(*c))
    }

    /// Resolve a field from its ordered candidate list.
    pub fn resolve(&self, candidates: &[Candidate]) -> Option<String> {
        first_non_empty(self.lookups(candidates))
    }

    /// A source field kept verbatim when it is a string.
    fn source_string(&self, name: &'static str) -> Option<String> {
        self.lookup(Source(name)).map(str::to_string)
    }

    /// Native relevance reported by the archive.
    fn native_score(&self) -> Option<f64> {
        self.hit.get("_score").and_then(Value::as_f64)
    }

    /// `value` object of the first `additional_metadata` entry named `name`.
    fn metadata_value(&self, name: &str) -> Option<&'a Value> {
        self.source
            .get("additional_metadata")?
            .as_array()?
            .iter()
            .filter(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
            .filter_map(|entry| entry.get("value"))
            .find(|value| value.is_object())
    }

    /// Title of the first acquisition step, if the hit records one.
    fn acquisition_title(&self) -> Option<&'a str> {
        self.source
            .get("creation_process")?
            .get("acquisition_process")?
            .as_array()?
            .first()?
            .get("title")?
            .as_str()
    }
}

/// Map a raw hit of `kind` into its canonical record.
pub fn map_hit(kind: SearchKind, hit: &Value, config: &SearchConfig) -> CanonicalResult {
    match kind {
        SearchKind::Datasets => CanonicalResult::Dataset(map_dataset_hit(hit, config)),
        SearchKind::Images => CanonicalResult::Image(map_image_hit(hit, config)),
    }
}

/// Map a raw dataset hit.
pub fn map_dataset_hit(hit: &Value, config: &SearchConfig) -> DatasetRecord {
    let view = HitView::new(hit);
    let accession = view.resolve(DATASET_ACCESSION);
    let title = first_non_empty(
        view.lookups(DATASET_TITLE)
            .chain([accession.as_deref()])
            .chain(view.lookups(DATASET_TITLE_TAIL)),
    )
    .unwrap_or_else(|| UNTITLED.to_string());
    let accession = accession.unwrap_or_default();

    DatasetRecord {
        title,
        url: config.study_url(&accession),
        accession,
        uuid: view.source_string("uuid"),
        description: view.source_string("description"),
        doi: view.source_string("doi"),
        release_date: view.source_string("release_date"),
        score: view.native_score(),
    }
}

/// Map a raw image hit.
pub fn map_image_hit(hit: &Value, config: &SearchConfig) -> ImageRecord {
    let view = HitView::new(hit);
    let file_pattern = view
        .metadata_value("file_pattern")
        .and_then(|value| value.get("file_pattern"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let acquisition_title = view.acquisition_title().map(str::to_string);
    let accession = view.resolve(IMAGE_ACCESSION).unwrap_or_default();
    let id = view.resolve(IMAGE_ID).unwrap_or_default();
    let title = first_non_empty(view.lookups(IMAGE_TITLE).chain([
        file_pattern.as_deref(),
        acquisition_title.as_deref(),
        Some(id.as_str()),
    ]))
    .unwrap_or_else(|| UNTITLED.to_string());

    ImageRecord {
        study_url: config.study_url(&accession),
        id,
        accession,
        title,
        dataset_uuid: view.source_string("submission_dataset_uuid"),
        file_pattern,
        acquisition_title,
        score: view.native_score(),
    }
}
