use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::ReviewError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Regex,
    Fuzzy,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Regex => "regex",
            MatchType::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchType::Exact),
            "regex" => Ok(MatchType::Regex),
            "fuzzy" => Ok(MatchType::Fuzzy),
            other => Err(ReviewError::InvalidArgument(format!(
                "unknown match type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

/// One keyword occurrence as returned by the extraction backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub keyword: String,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_section: Option<String>,
    pub snippet: String,
    #[serde(default)]
    pub context_before: String,
    #[serde(default)]
    pub context_after: String,
    #[serde(default)]
    pub context_window: String,
    pub confidence: f64,
    pub match_type: MatchType,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_window: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMeta {
    pub filename: String,
    pub num_pages: u32,
    pub parse_time_ms: u64,
}

/// Output of one parse job, in the shape `POST /parse` returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    pub document: DocumentMeta,
    #[serde(rename = "results")]
    pub records: Vec<MatchRecord>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ResultSet {
    pub fn total_matches(&self) -> usize {
        self.records.len()
    }

    pub fn matched_pages(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.page)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Row of `GET /results`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSummary {
    pub id: u64,
    pub filename: String,
    pub created_at: String,
    pub total_matches: u64,
    pub matched_pages: u64,
    pub num_pages: u32,
    pub parse_time_ms: u64,
}

/// Body of `GET /results/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultDetail {
    pub id: u64,
    pub filename: String,
    pub num_pages: u32,
    pub total_matches: u64,
    pub matched_pages: u64,
    pub parse_time_ms: u64,
    pub results: Vec<MatchRecord>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    pub created_at: String,
}

impl From<ResultDetail> for ResultSet {
    fn from(detail: ResultDetail) -> Self {
        Self {
            document: DocumentMeta {
                filename: detail.filename,
                num_pages: detail.num_pages,
                parse_time_ms: detail.parse_time_ms,
            },
            records: detail.results,
            meta: detail.meta,
            result_id: Some(detail.id),
            created_at: Some(detail.created_at),
        }
    }
}

/// A document handed to `POST /parse`.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parse_response_payload_deserializes() {
        let payload = json!({
            "document": {"filename": "spec.pdf", "num_pages": 12, "parse_time_ms": 840},
            "results": [{
                "keyword": "submittals",
                "page": 4,
                "section_hint": "PART 1 GENERAL",
                "spec_section": "01 33 00",
                "snippet": "Submittals",
                "context_before": "1.3 ",
                "context_after": " shall be provided.",
                "context_window": "1.3 Submittals shall be provided.",
                "confidence": 0.95,
                "match_type": "exact",
                "positions": [{"start": 4, "end": 14}],
                "proximity_window": 80
            }],
            "meta": {"matched_pages": 1, "total_matches": 1, "keywords_used": null},
            "result_id": 42
        });

        let result: ResultSet = serde_json::from_value(payload).expect("payload should parse");
        assert_eq!(result.result_id, Some(42));
        assert_eq!(result.records[0].match_type, MatchType::Exact);
        assert_eq!(result.records[0].positions, vec![Position { start: 4, end: 14 }]);
        assert_eq!(result.meta.get("keywords_used"), Some(&Value::Null));
    }

    #[test]
    fn detail_converts_into_result_set_with_id() {
        let detail = ResultDetail {
            id: 9,
            filename: "old.pdf".to_string(),
            num_pages: 2,
            total_matches: 1,
            matched_pages: 1,
            parse_time_ms: 10,
            results: vec![fixtures::record("roof", 1, None)],
            meta: Map::new(),
            created_at: "2024-05-01T10:00:00".to_string(),
        };

        let result = ResultSet::from(detail);
        assert_eq!(result.result_id, Some(9));
        assert_eq!(result.document.filename, "old.pdf");
        assert_eq!(result.created_at.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[test]
    fn matched_pages_counts_distinct_pages() {
        let result = fixtures::result_set(
            "a.pdf",
            vec![
                fixtures::record("a", 1, None),
                fixtures::record("b", 1, None),
                fixtures::record("c", 3, None),
            ],
        );
        assert_eq!(result.total_matches(), 3);
        assert_eq!(result.matched_pages(), 2);
    }

    #[test]
    fn match_type_parses_case_insensitively() {
        assert_eq!("Fuzzy".parse::<MatchType>().ok(), Some(MatchType::Fuzzy));
        assert!("approximate".parse::<MatchType>().is_err());
    }
}
