//! Human-readable renderings for assistants built on top of the search.

use crate::orchestrator::search::ArchiveSearch;
use crate::types::{SearchKind, SearchResponse};

/// Reminder appended to summaries; the beta index is known to be partial.
const BETA_NOTE: &str = "Note: BioImage Archive beta search can be incomplete or intermittent.";

/// Queries run by [`probe_index`], with a small limit each.
const PROBES: &[(SearchKind, &str)] = &[
    (SearchKind::Datasets, "tumor"),
    (SearchKind::Datasets, "mouse"),
    (SearchKind::Datasets, "cancer"),
    (SearchKind::Images, "tumor"),
];
const PROBE_LIMIT: usize = 3;
const PROBE_SAMPLE_TITLES: usize = 3;

/// Render up to `max_items` dataset results as a numbered list.
///
/// Each line carries the accession, study URL, and score when known. An
/// empty response renders a single explanatory sentence instead.
pub fn format_dataset_summary(response: &SearchResponse, max_items: usize) -> String {
    if response.results.is_empty() {
        return format!(
            "No dataset results were found for query '{}'. \
             The BioImage Archive beta index may be incomplete/intermittent.",
            response.query
        );
    }

    let mut lines = vec![format!(
        "Here are up to {max_items} BioImage Archive dataset matches:"
    )];
    for (idx, entry) in response.results.iter().take(max_items).enumerate() {
        let mut line = format!("{}. {}", idx + 1, entry.title());
        let accession = entry.accession();
        if !accession.is_empty() {
            line.push_str(&format!(" [{accession}]"));
        }
        if let Some(url) = entry.url() {
            line.push_str(&format!(" - {url}"));
        }
        if let Some(score) = entry.score() {
            line.push_str(&format!(" (score {score:.2})"));
        }
        lines.push(line);
    }
    lines.push(format!("(Total hits reported by API: {})", response.total));
    lines.push(String::new());
    lines.push(BETA_NOTE.to_string());
    lines.join("\n")
}

/// A short guide to the archive's advanced query syntax.
pub fn explain_advanced_query_syntax() -> &'static str {
    "Advanced search syntax:\n\
     - Words are case-insensitive.\n\
     - Default behavior is OR across terms.\n\
     - Use AND / OR / NOT and parentheses for boolean logic.\n\
     - Use quoted phrases for exact matching.\n\
     - Wildcards: * for any sequence, ? for a single character.\n\
     Examples:\n\
     1) confocal fluorescence microscopy\n\
     2) confocal AND fluorescence AND microscopy\n\
     3) \"confocal fluorescence microscopy\"\n\
     4) microscopy AND (fluorescence OR confocal)\n\
     5) microscopy AND NOT (fluorescence OR confocal)\n"
}

/// Run a handful of fixed queries and describe what the index returns.
///
/// Useful as startup context for an assistant: it shows which broad terms
/// currently have coverage. Failures are reported inline, never raised.
pub async fn probe_index(search: &ArchiveSearch) -> Vec<String> {
    let mut lines = Vec::with_capacity(PROBES.len());
    for &(kind, query) in PROBES {
        match search.search(kind, query, PROBE_LIMIT).await {
            Ok(response) => {
                let titles: Vec<&str> = response
                    .results
                    .iter()
                    .take(PROBE_SAMPLE_TITLES)
                    .map(|r| r.title().trim())
                    .filter(|t| !t.is_empty())
                    .collect();
                lines.push(format!(
                    "{kind}:{query} -> total={}, sample_titles={titles:?}",
                    response.total
                ));
            }
            Err(err) => {
                tracing::warn!(%kind, error = %err, "index probe failed");
                lines.push(format!("{kind}:{query} -> error={err}"));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompactDataset, CompactResult};

    fn response(results: Vec<CompactResult>) -> SearchResponse {
        SearchResponse {
            query: "mouse tumor".into(),
            url: "https://archive.example/fts?query=mouse%20tumor".into(),
            total: 42,
            results,
            enriched_with_query: None,
            fallback_from_query: None,
            fallback_terms_used: None,
        }
    }

    fn dataset(title: &str, accession: &str, url: Option<&str>, score: Option<f64>) -> CompactResult {
        CompactResult::Dataset(CompactDataset {
            title: title.into(),
            accession: accession.into(),
            url: url.map(str::to_string),
            doi: None,
            release_date: None,
            score,
        })
    }

    #[test]
    fn empty_summary_mentions_query() {
        let text = format_dataset_summary(&response(vec![]), 5);
        assert_eq!(
            text,
            "No dataset results were found for query 'mouse tumor'. \
             The BioImage Archive beta index may be incomplete/intermittent."
        );
    }

    #[test]
    fn summary_lines_include_available_parts() {
        let text = format_dataset_summary(
            &response(vec![
                dataset("Full", "S-1", Some("https://s/S-1"), Some(3.14159)),
                dataset("No url", "S-2", None, None),
                dataset("Url only", "", Some("https://s/x"), None),
                dataset("Bare", "", None, Some(1.0)),
            ]),
            5,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Here are up to 5 BioImage Archive dataset matches:");
        assert_eq!(lines[1], "1. Full [S-1] - https://s/S-1 (score 3.14)");
        assert_eq!(lines[2], "2. No url [S-2]");
        assert_eq!(lines[3], "3. Url only - https://s/x");
        assert_eq!(lines[4], "4. Bare (score 1.00)");
        assert_eq!(lines[5], "(Total hits reported by API: 42)");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], BETA_NOTE);
    }

    #[test]
    fn summary_respects_max_items() {
        let results = (0..6)
            .map(|i| dataset(&format!("T{i}"), &format!("S-{i}"), None, None))
            .collect();
        let text = format_dataset_summary(&response(results), 2);
        assert!(text.contains("2. T1 [S-1]"));
        assert!(!text.contains("3. T2"));
    }

    #[test]
    fn syntax_guide_lists_operators() {
        let guide = explain_advanced_query_syntax();
        assert!(guide.starts_with("Advanced search syntax:\n"));
        assert!(guide.contains("Use AND / OR / NOT"));
        assert!(guide.contains("5) microscopy AND NOT (fluorescence OR confocal)\n"));
    }
}
