//! Normalisation of archive response payloads.
//!
//! The archive has served two response dialects: a flat `{"hits": [...]}`
//! list, and the search-engine style `{"hits": {"hits": [...], "total":
//! {"value": N}}}`. [`PayloadShape::parse`] classifies a payload once so
//! nothing downstream has to care which one arrived.

use serde_json::Value;

/// The recognised payload dialects.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape<'a> {
    /// `hits` is the list itself.
    Flat(&'a [Value]),
    /// `hits` wraps a nested list and an optional reported total.
    Nested {
        hits: &'a [Value],
        total: Option<u64>,
    },
    /// Anything else; treated as an empty result set.
    Unrecognized,
}

impl<'a> PayloadShape<'a> {
    /// Classify `payload` without copying any hits.
    pub fn parse(payload: &'a Value) -> Self {
        let Some(hits) = payload.as_object().and_then(|obj| obj.get("hits")) else {
            return Self::Unrecognized;
        };
        match hits {
            Value::Array(list) => Self::Flat(list),
            Value::Object(wrapper) => {
                let nested = wrapper
                    .get("hits")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let total = wrapper
                    .get("total")
                    .and_then(Value::as_object)
                    .and_then(|total| total.get("value"))
                    .and_then(Value::as_u64);
                Self::Nested {
                    hits: nested,
                    total,
                }
            }
            _ => Self::Unrecognized,
        }
    }

    /// The hit list and the total the archive reports for it.
    pub fn into_hits_and_total(self) -> (&'a [Value], u64) {
        match self {
            Self::Flat(hits) => (hits, hits.len() as u64),
            Self::Nested { hits, total } => (hits, total.unwrap_or(hits.len() as u64)),
            Self::Unrecognized => (&[], 0),
        }
    }
}

/// Extract `(hits, total)` from any payload. Never fails.
pub fn normalize_hits(payload: &Value) -> (Vec<Value>, u64) {
    let (hits, total) = PayloadShape::parse(payload).into_hits_and_total();
    (hits.to_vec(), total)
}
