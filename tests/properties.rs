//! Property-based tests for extraction, filtering and diffing
//!
//! These check the guarantees every caller relies on: the tokenizer and the
//! extractor never panic, plain text survives extraction untouched, filtering
//! is idempotent, diff segments partition both sequences, the default
//! alignment keeps a longest common subsequence and a text always compares
//! identical to itself.

use proptest::prelude::*;
use rtfdiff::normalize::normalize;
use rtfdiff::rtf::{tokenize, Extractor};
use rtfdiff::{
    compare, diff::diff_sequences, extract, BoilerplateFilter, CompareOptions, DiffAlgorithm,
    DiffOptions, ExtractedText, Granularity, NormalizeOptions, SegmentKind,
};
use std::sync::Arc;

/// Text with no RTF syntax in it at all
fn plain_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,;:!?()'\"-]{0,120}"
}

/// Fragments of RTF, both valid and broken
fn rtf_fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{1,10}",
        Just("{".to_string()),
        Just("}".to_string()),
        Just("\\par ".to_string()),
        Just("\\'e9".to_string()),
        Just("\\'".to_string()),
        Just("\\".to_string()),
        Just("\\*".to_string()),
        Just("{\\fonttbl ".to_string()),
        Just("\\ansicpg932 ".to_string()),
        Just("\\uc2 ".to_string()),
        "\\\\u-?[0-9]{1,6}\\??",
        "\\\\bin[0-9]{1,3} ",
        "\\\\[a-z]{1,8}-?[0-9]{0,12} ?",
        "\\PC{1,5}",
        Just("\n".to_string()),
    ]
}

fn rtf_document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(rtf_fragment_strategy(), 0..40)
        .prop_map(|fragments| format!("{{\\rtf1 {}", fragments.concat()))
}

/// Lines a report generator might print
fn report_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][a-z ]{0,20}",
        "[0-9]{1,3}\\.[0-9]",
        "Page [1-9] of [1-9]",
        "CONFIDENTIAL",
        "-{3,10}",
        "Generated on: 2024-0[1-9]-1[0-9] 1[0-9]:00:00",
        "",
        "  ",
    ]
}

fn report_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(report_line_strategy(), 0..15).prop_map(|lines| lines.join("\n"))
}

fn words_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[abcd]", 0..25).prop_map(|words| words.join(" "))
}

fn options_strategy() -> impl Strategy<Value = CompareOptions> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(filter, case, punctuation, whitespace, lines)| {
            CompareOptions::default()
                .filter_boilerplate(filter)
                .ignore_case(case)
                .ignore_punctuation(punctuation)
                .normalize_whitespace(whitespace)
                .with_granularity(if lines {
                    Granularity::Line
                } else {
                    Granularity::Word
                })
        })
}

fn sequence(text: &str) -> rtfdiff::normalize::NormalizedSequence {
    normalize(
        Arc::new(ExtractedText::from_plain(text)),
        &NormalizeOptions::default(),
    )
}

/// Textbook LCS length, kept independent of the engine's own table.
fn lcs_length(a: &[&str], b: &[&str]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    for x in a {
        let mut current = vec![0usize; b.len() + 1];
        for (j, y) in b.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        previous = current;
    }
    previous[b.len()]
}

proptest! {
    #[test]
    fn test_tokenize_never_panics(input in rtf_document_strategy()) {
        let _tokens = tokenize(&input);
    }

    #[test]
    fn test_extract_never_panics(input in rtf_document_strategy()) {
        let extraction = Extractor::default().extract_source(&input);
        prop_assert!(extraction.text.len() <= input.len() * 4 + 4);
    }

    #[test]
    fn test_extract_arbitrary_bytes(tail in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut bytes = b"{\\rtf1 ".to_vec();
        bytes.extend(tail);
        prop_assert!(extract(&bytes).is_ok());
    }

    #[test]
    fn test_plain_text_round_trip(text in plain_text_strategy()) {
        let source = format!("{{\\rtf1 {}}}", text);
        let extraction = extract(source.as_bytes()).unwrap();
        prop_assert_eq!(extraction.text.as_str(), text.as_str());
        prop_assert!(!extraction.is_malformed());
        prop_assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent(text in report_text_strategy()) {
        let filter = BoilerplateFilter::new();
        let once = filter.filter(&ExtractedText::from_plain(text), true);
        let twice = filter.filter(&once, true);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_disabled_filter_is_noop(text in report_text_strategy()) {
        let original = ExtractedText::from_plain(text);
        prop_assert_eq!(BoilerplateFilter::new().filter(&original, false), original);
    }

    #[test]
    fn test_diff_partitions_both_sequences(
        reference in words_strategy(),
        comparison in words_strategy(),
        algorithm in prop_oneof![
            Just(DiffAlgorithm::Lcs),
            Just(DiffAlgorithm::Myers),
            Just(DiffAlgorithm::Patience),
        ],
    ) {
        let a = sequence(&reference);
        let b = sequence(&comparison);
        let options = DiffOptions { algorithm, ..DiffOptions::default() };
        let segments = diff_sequences(&a, &b, &options);
        let (a_keys, b_keys) = (a.keys(), b.keys());

        let mut old_pos = 0;
        let mut new_pos = 0;
        for segment in &segments {
            prop_assert_eq!(segment.reference.units.start, old_pos);
            prop_assert_eq!(segment.comparison.units.start, new_pos);
            match segment.kind {
                SegmentKind::Inserted => prop_assert!(segment.reference.units.is_empty()),
                SegmentKind::Deleted => prop_assert!(segment.comparison.units.is_empty()),
                SegmentKind::Replaced => {
                    prop_assert!(!segment.reference.units.is_empty());
                    prop_assert!(!segment.comparison.units.is_empty());
                }
                SegmentKind::Equal => prop_assert_eq!(
                    &a_keys[segment.reference.units.clone()],
                    &b_keys[segment.comparison.units.clone()]
                ),
            }
            old_pos = segment.reference.units.end;
            new_pos = segment.comparison.units.end;
        }
        prop_assert_eq!(old_pos, a.len());
        prop_assert_eq!(new_pos, b.len());
    }

    #[test]
    fn test_lcs_alignment_is_longest(
        reference in words_strategy(),
        comparison in words_strategy(),
    ) {
        let a = sequence(&reference);
        let b = sequence(&comparison);
        let matched: usize = diff_sequences(&a, &b, &DiffOptions::default())
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Equal)
            .map(|segment| segment.reference.units.len())
            .sum();
        prop_assert_eq!(matched, lcs_length(&a.keys(), &b.keys()));
    }

    #[test]
    fn test_identical_input(text in report_text_strategy(), options in options_strategy()) {
        let extracted = ExtractedText::from_plain(text);
        let result = compare(&extracted, &extracted, &options);
        prop_assert!(result.identical);
        prop_assert_eq!(result.counts.total_changes(), 0);
    }
}
