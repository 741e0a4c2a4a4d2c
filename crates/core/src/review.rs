use crate::dedupe::dedupe;
use crate::models::{MatchRecord, MatchType, ResultSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::ReviewError;

/// Row filters; an empty or unset value matches everything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct ReviewFilters {
    pub page: Option<String>,
    pub keyword: Option<String>,
    pub match_type: Option<MatchType>,
}

impl ReviewFilters {
    pub fn is_empty(&self) -> bool {
        active(&self.page).is_none() && active(&self.keyword).is_none() && self.match_type.is_none()
    }

    pub fn matches(&self, record: &MatchRecord) -> bool {
        let page_ok = active(&self.page).map_or(true, |page| record.page.to_string() == page);

        let keyword_ok = active(&self.keyword).map_or(true, |needle| {
            let needle = needle.to_lowercase();
            record.keyword.to_lowercase().contains(&needle)
                || record.snippet.to_lowercase().contains(&needle)
        });

        let match_type_ok = self
            .match_type
            .map_or(true, |match_type| record.match_type == match_type);

        page_ok && keyword_ok && match_type_ok
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Keyword,
    Page,
    Confidence,
    MatchType,
    SpecSection,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Keyword => "keyword",
            SortKey::Page => "page",
            SortKey::Confidence => "confidence",
            SortKey::MatchType => "match_type",
            SortKey::SpecSection => "spec_section",
        }
    }

    fn compare(&self, left: &MatchRecord, right: &MatchRecord) -> Ordering {
        match self {
            SortKey::Keyword => locale_compare(&left.keyword, &right.keyword),
            SortKey::Page => left.page.cmp(&right.page),
            SortKey::Confidence => left.confidence.total_cmp(&right.confidence),
            SortKey::MatchType => locale_compare(left.match_type.as_str(), right.match_type.as_str()),
            SortKey::SpecSection => locale_compare(
                left.spec_section.as_deref().unwrap_or_default(),
                right.spec_section.as_deref().unwrap_or_default(),
            ),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ReviewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keyword" => Ok(SortKey::Keyword),
            "page" => Ok(SortKey::Page),
            "confidence" => Ok(SortKey::Confidence),
            "match_type" => Ok(SortKey::MatchType),
            "spec_section" | "section" => Ok(SortKey::SpecSection),
            other => Err(ReviewError::InvalidArgument(format!("unknown sort key: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

// Case-folded first so "b" sorts before "C", raw text breaks the tie.
fn locale_compare(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

pub fn apply(
    records: &[MatchRecord],
    filters: &ReviewFilters,
    sort_key: Option<SortKey>,
    direction: SortDirection,
) -> Vec<MatchRecord> {
    let mut rows: Vec<MatchRecord> = records
        .iter()
        .filter(|record| filters.matches(record))
        .cloned()
        .collect();

    if let Some(key) = sort_key {
        rows.sort_by(|left, right| match direction {
            SortDirection::Asc => key.compare(left, right),
            SortDirection::Desc => key.compare(right, left),
        });
    }

    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub filters: ReviewFilters,
    pub sort_key: Option<SortKey>,
    pub direction: SortDirection,
    pub expanded: BTreeSet<usize>,
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Same key flips the direction, a new key starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.sort_key = Some(key);
            self.direction = SortDirection::Asc;
        }
    }

    pub fn toggle_expanded(&mut self, index: usize) {
        if !self.expanded.remove(&index) {
            self.expanded.insert(index);
        }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn clear_filters(&mut self) {
        self.filters = ReviewFilters::default();
    }

    pub fn apply(&self, records: &[MatchRecord]) -> Vec<MatchRecord> {
        apply(records, &self.filters, self.sort_key, self.direction)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRows {
    pub rows: Vec<MatchRecord>,
    pub total: usize,
    pub unique: usize,
}

pub fn review_rows(result: &ResultSet, view: &ViewState) -> ReviewRows {
    let unique = dedupe(&result.records);
    let rows = view.apply(&unique);

    ReviewRows {
        total: result.records.len(),
        unique: unique.len(),
        rows,
    }
}
