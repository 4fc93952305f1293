//! Search orchestrator: primary query, reranking, dedup, and fallback.
//!
//! This module runs the caller's query against the archive, reorders
//! dataset results by heuristic relevance, and falls back to simpler
//! sub-queries when the primary results are empty or weak. Results from
//! several sub-queries are merged without duplicates.

pub mod dedup;
pub mod scoring;
pub mod search;
