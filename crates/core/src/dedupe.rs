use crate::models::MatchRecord;
use std::collections::HashSet;

pub fn dedupe_key(record: &MatchRecord) -> (u32, &str, &str) {
    (
        record.page,
        record.spec_section.as_deref().unwrap_or_default(),
        record.section_hint.as_deref().unwrap_or_default(),
    )
}

pub fn dedupe(records: &[MatchRecord]) -> Vec<MatchRecord> {
    dedupe_with_report(records).0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupeReport {
    pub kept: usize,
    pub discarded: usize,
}

pub fn dedupe_with_report(records: &[MatchRecord]) -> (Vec<MatchRecord>, DedupeReport) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for record in records {
        if seen.insert(dedupe_key(record)) {
            kept.push(record.clone());
        }
    }

    let report = DedupeReport {
        kept: kept.len(),
        discarded: records.len() - kept.len(),
    };
    (kept, report)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::models::fixtures::record;
    use proptest::prelude::*;

    fn arb_records() -> impl Strategy<Value = Vec<MatchRecord>> {
        prop::collection::vec(
            (1u32..5, prop::option::of(0u8..3), prop::option::of(0u8..2)),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(index, (page, section, hint))| {
                    let mut item = record(&format!("kw{index}"), page, None);
                    item.spec_section = section.map(|value| format!("S{value}"));
                    item.section_hint = hint.map(|value| format!("H{value}"));
                    item
                })
                .collect()
        })
    }

    proptest! {
        /// Property: output never grows and holds each key once
        #[test]
        fn output_keys_are_unique(records in arb_records()) {
            let output = dedupe(&records);
            prop_assert!(output.len() <= records.len());

            let keys: HashSet<_> = output.iter().map(dedupe_key).collect();
            prop_assert_eq!(keys.len(), output.len());
        }

        /// Property: every kept record is the first input record with its key,
        /// and kept records appear in input order
        #[test]
        fn keeps_first_seen_in_order(records in arb_records()) {
            let output = dedupe(&records);

            let mut expected = Vec::new();
            let mut seen = HashSet::new();
            for item in &records {
                if seen.insert(dedupe_key(item)) {
                    expected.push(item.keyword.clone());
                }
            }

            let actual: Vec<_> = output.iter().map(|item| item.keyword.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
