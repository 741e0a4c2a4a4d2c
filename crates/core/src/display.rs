use crate::models::MatchRecord;
use chrono::{DateTime, NaiveDateTime};

pub const SNIPPET_MAX_CHARS: usize = 100;

pub fn truncate_snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{head}...")
}

pub fn needs_expansion(record: &MatchRecord) -> bool {
    record.snippet.chars().count() > SNIPPET_MAX_CHARS
}

/// Authoritative section first, then the heuristic hint, else "-".
pub fn section_label(record: &MatchRecord) -> &str {
    [record.spec_section.as_deref(), record.section_hint.as_deref()]
        .into_iter()
        .flatten()
        .find(|label| !label.is_empty())
        .unwrap_or("-")
}

pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

pub fn format_parse_time(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", ms as f64 / 1_000.0)
    }
}

pub fn format_created_at(raw: &str) -> String {
    const OUTPUT: &str = "%B %-d, %Y %H:%M";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(OUTPUT).to_string();
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map(|parsed| parsed.format(OUTPUT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn showing_line(shown: usize, total: usize) -> String {
    format!("Showing {shown} of {total} results")
}
