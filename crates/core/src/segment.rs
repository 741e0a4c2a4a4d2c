use crate::models::MatchRecord;
use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+\s+").expect("sentence boundary pattern is valid"));

pub fn segment(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        push_sentence(&mut sentences, &text[start..boundary.end()]);
        start = boundary.end();
    }

    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub sentences: Vec<String>,
    pub highlighted: Option<usize>,
}

impl Highlight {
    pub fn highlighted_sentence(&self) -> Option<&str> {
        self.highlighted
            .and_then(|index| self.sentences.get(index))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| (sentence.as_str(), self.highlighted == Some(index)))
    }
}

pub fn highlight(text: &str, keyword: &str) -> Highlight {
    let sentences = segment(text);
    let needle = keyword.to_lowercase();
    let highlighted = sentences
        .iter()
        .position(|sentence| sentence.to_lowercase().contains(&needle));

    Highlight {
        sentences,
        highlighted,
    }
}

pub fn context_for(record: &MatchRecord) -> Highlight {
    if record.context_window.trim().is_empty() {
        let stitched = format!(
            "{}{}{}",
            record.context_before, record.snippet, record.context_after
        );
        highlight(&stitched, &record.keyword)
    } else {
        highlight(&record.context_window, &record.keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_each_terminal_punctuation() {
        assert_eq!(segment("A. B! C? D"), vec!["A.", "B!", "C?", "D"]);
    }

    #[test]
    fn punctuation_runs_stay_with_their_sentence() {
        assert_eq!(
            segment("Really?!  Yes...\n\tFine"),
            vec!["Really?!", "Yes...", "Fine"]
        );
    }

    #[test]
    fn text_without_boundaries_is_one_sentence() {
        assert_eq!(segment("  No boundaries here  "), vec!["No boundaries here"]);
    }

    #[test]
    fn abbreviations_split_but_inner_periods_do_not() {
        assert_eq!(segment("See No. 5 below."), vec!["See No.", "5 below."]);
        assert_eq!(segment("Version 1.5 applies"), vec!["Version 1.5 applies"]);
    }

    #[test]
    fn empty_and_whitespace_input_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n ").is_empty());
        assert_eq!(highlight("", "dog").highlighted, None);
    }

    #[test]
    fn trailing_boundary_leaves_no_empty_sentence() {
        assert_eq!(segment("One. Two. "), vec!["One.", "Two."]);
    }

    #[test]
    fn highlight_marks_first_sentence_with_keyword() {
        let result = highlight("The cat sat. The dog ran.", "dog");
        assert_eq!(result.sentences, vec!["The cat sat.", "The dog ran."]);
        assert_eq!(result.highlighted, Some(1));
        assert_eq!(result.highlighted_sentence(), Some("The dog ran."));

        let flags: Vec<bool> = result.iter().map(|(_, marked)| marked).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn highlight_is_case_insensitive_and_picks_first() {
        let result = highlight("Dog one. DOG two.", "dog");
        assert_eq!(result.highlighted, Some(0));
    }

    #[test]
    fn highlight_without_match_marks_nothing() {
        let result = highlight("No boundaries here", "xyz");
        assert_eq!(result.sentences.len(), 1);
        assert_eq!(result.highlighted, None);
        assert_eq!(result.highlighted_sentence(), None);
    }

    #[test]
    fn highlight_is_repeatable() {
        let text = "Shop drawings required. Submit samples! Done?";
        assert_eq!(highlight(text, "samples"), highlight(text, "samples"));
    }

    #[test]
    fn context_uses_window_or_stitched_parts() {
        let mut record = fixtures::record("warranty", 2, None);
        record.context_window = "Scope applies. Warranty is two years.".to_string();
        let context = context_for(&record);
        assert_eq!(context.highlighted, Some(1));

        record.context_window = String::new();
        record.context_before = "General notes. Extended ".to_string();
        record.snippet = "warranty".to_string();
        record.context_after = " required.".to_string();
        let context = context_for(&record);
        assert_eq!(
            context.sentences,
            vec!["General notes.", "Extended warranty required."]
        );
        assert_eq!(context.highlighted, Some(1));
    }
}
