//! Best-effort extraction of search queries from stage-1 output.
//!
//! Generated outlines are free text, so this is a regex heuristic, kept
//! deliberately small and covered by literal fixtures. When it comes up
//! empty the driver falls back to [`default_queries`] so a supplied brief
//! always produces some search activity.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Hard cap on extracted queries.
pub const MAX_QUERIES: usize = 8;

/// Number of fallback queries built from the brief.
pub const DEFAULT_QUERY_COUNT: usize = 5;

static QUERIES_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)search\s+quer(?:y|ies)[^\n]*\n(?P<block>.*)").unwrap()
});

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(?:[-*•]+|\d{1,2}[.)])?\s*["']?"#).unwrap());

static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*•]\s+\S").unwrap());

static BOOLEAN_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(AND|OR|NOT)\b").unwrap());

static INNER_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Mine candidate search queries out of a generated outline.
///
/// Prefers the block under a "search queries" heading; otherwise scans the
/// whole text. Falls back to generic bullet lines when nothing survives the
/// query-likeness filter. Deduplicates case-insensitively and caps the
/// result at [`MAX_QUERIES`].
pub fn extract_queries(outline: &str) -> Vec<String> {
    let block = queries_block(outline);
    let scope = block.as_deref().unwrap_or(outline);

    let mut candidates: Vec<String> = scope
        .lines()
        .filter(|line| !is_heading(line))
        .map(strip_list_marker)
        .filter(|line| looks_like_query(line))
        .collect();

    if candidates.is_empty() {
        candidates = outline
            .lines()
            .filter(|line| BULLET_LINE.is_match(line))
            .map(strip_list_marker)
            .filter(|line| !line.is_empty())
            .collect();
    }

    dedup_and_cap(candidates)
}

/// Fixed fallback query set, templated over the first line of the brief so
/// a failed extraction still yields on-topic searches.
pub fn default_queries(brief: &str) -> Vec<String> {
    let topic: String = brief
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .split_whitespace()
        .take(12)
        .collect::<Vec<_>>()
        .join(" ");

    let topic = if topic.is_empty() {
        "the research topic".to_string()
    } else {
        topic
    };

    vec![
        format!("{topic} overview"),
        format!("{topic} recent peer-reviewed research"),
        format!("{topic} key statistics"),
        format!("{topic} systematic review"),
        format!("{topic} policy debate"),
    ]
}

/// The lines under a "search queries" heading, up to the next blank line.
fn queries_block(text: &str) -> Option<String> {
    let caps = QUERIES_HEADING.captures(text)?;
    let rest = caps.name("block")?.as_str();

    let mut lines = Vec::new();
    let mut started = false;
    for line in rest.lines() {
        if line.trim().is_empty() {
            if started {
                break;
            }
            continue;
        }
        started = true;
        lines.push(line);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.ends_with(':') || trimmed.starts_with('#')
}

fn strip_list_marker(line: &str) -> String {
    let cleaned = LIST_MARKER.replace(line, "");
    INNER_WHITESPACE
        .replace_all(cleaned.trim(), " ")
        .into_owned()
}

/// A query-like line has at least three words and either boolean operators,
/// a quoted phrase, or a short keyword shape rather than prose.
fn looks_like_query(line: &str) -> bool {
    let words = line.split_whitespace().count();
    if words < 3 {
        return false;
    }
    BOOLEAN_OPERATOR.is_match(line)
        || line.contains('"')
        || (words <= 12 && !line.ends_with('.'))
}

fn dedup_and_cap(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut queries = Vec::new();

    for candidate in candidates {
        if candidate.is_empty() {
            continue;
        }
        if seen.insert(candidate.to_lowercase()) {
            queries.push(candidate);
            if queries.len() == MAX_QUERIES {
                break;
            }
        }
    }

    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numbered_block_under_heading() {
        let outline =
            "Targeted Search Queries:\n1. \"carbon tax\" AND OECD\n2. ETS emissions trading\n\nNext section";
        let queries = extract_queries(outline);
        assert_eq!(
            queries,
            vec![
                "carbon tax\" AND OECD".to_string(),
                "ETS emissions trading".to_string()
            ]
        );
    }

    #[test]
    fn no_query_like_lines_yields_empty() {
        let outline = "A plain paragraph about the topic that runs on as ordinary prose, \
                       never once resembling anything like a short keyword search string.";
        assert!(extract_queries(outline).is_empty());
    }

    #[test]
    fn scans_whole_text_when_heading_is_absent() {
        let outline = "Some intro prose that is definitely long enough to be skipped over here.\n\
                       \"renewable subsidies\" NOT biofuel\n\
                       electricity grid storage costs";
        let queries = extract_queries(outline);
        assert!(queries.contains(&"renewable subsidies\" NOT biofuel".to_string()));
        assert!(queries.contains(&"electricity grid storage costs".to_string()));
    }

    #[test]
    fn falls_back_to_bullet_lines() {
        // Bullet items of two words fail the query-likeness filter, but the
        // generic bullet fallback still collects them.
        let outline = "Outline:\n- carbon pricing\n- border adjustment\n";
        let queries = extract_queries(outline);
        assert_eq!(
            queries,
            vec!["carbon pricing".to_string(), "border adjustment".to_string()]
        );
    }

    #[test]
    fn deduplicates_case_insensitively_and_collapses_whitespace() {
        let outline = "Search queries:\n1. carbon  tax   revenue use\n2. Carbon Tax Revenue Use\n";
        let queries = extract_queries(outline);
        assert_eq!(queries, vec!["carbon tax revenue use".to_string()]);
    }

    #[test]
    fn caps_at_maximum_count() {
        let mut outline = String::from("Search queries:\n");
        for i in 0..12 {
            outline.push_str(&format!("{}. topic facet number {i}\n", i + 1));
        }
        let queries = extract_queries(&outline);
        assert_eq!(queries.len(), MAX_QUERIES);
        assert_eq!(queries[0], "topic facet number 0");
    }

    #[test]
    fn headings_are_not_candidates() {
        let outline = "Search queries:\nRelated Sub-Heading Goes Here:\n1. \"solar panel\" AND tariffs\n";
        let queries = extract_queries(outline);
        assert_eq!(queries, vec!["solar panel\" AND tariffs".to_string()]);
    }

    #[test]
    fn default_queries_template_the_brief_topic() {
        let queries = default_queries("Impact of carbon taxes\nMore detail here.");
        assert_eq!(queries.len(), DEFAULT_QUERY_COUNT);
        assert_eq!(queries[0], "Impact of carbon taxes overview");
        assert!(queries.iter().all(|q| q.contains("Impact of carbon taxes")));
    }

    #[test]
    fn default_queries_survive_an_empty_brief() {
        let queries = default_queries("");
        assert_eq!(queries.len(), DEFAULT_QUERY_COUNT);
        assert!(queries[0].starts_with("the research topic"));
    }
}
