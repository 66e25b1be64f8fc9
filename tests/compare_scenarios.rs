//! End-to-end comparison scenarios
//!
//! RTF in, report data out. The literal scenarios the comparison contract is
//! defined by, plus a pair of real-looking listings from two program runs.

use rstest::rstest;
use rtfdiff::{
    compare, compare_all, extract, BatchOptions, CompareOptions, ExtractedText, Granularity,
    NamedDocument, SegmentKind, Side,
};
use std::path::PathBuf;

fn plain(text: &str) -> ExtractedText {
    ExtractedText::from_plain(text)
}

fn rtf(source: &str) -> ExtractedText {
    extract(source.as_bytes()).unwrap().text
}

fn kinds(reference: &str, comparison: &str, options: &CompareOptions) -> Vec<SegmentKind> {
    compare(&plain(reference), &plain(comparison), options)
        .segments
        .iter()
        .map(|segment| segment.kind)
        .collect()
}

fn fixture(name: &str) -> NamedDocument {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    NamedDocument::new(name, std::fs::read(path).expect("Failed to read fixture"))
}

#[test]
fn test_case_fold_transparency() {
    let options = CompareOptions::default().ignore_case(true);
    let result = compare(&plain("Hello World"), &plain("hello world"), &options);
    assert!(result.identical);
    assert_eq!(result.changes().count(), 0);
    assert_eq!(result.segments[0].display_text(Side::Reference), "Hello World");
}

#[rstest]
#[case::sharp_s("STRASSE", "straße")]
#[case::final_sigma("ΣΟΦΟΣ", "σοφος")]
#[case::ligature("ﬁnal", "FINAL")]
fn test_case_fold_beyond_lowercase(#[case] reference: &str, #[case] comparison: &str) {
    let options = CompareOptions::default().ignore_case(true);
    assert!(compare(&plain(reference), &plain(comparison), &options).identical);
    assert!(!compare(&plain(reference), &plain(comparison), &CompareOptions::default()).identical);
}

#[rstest]
#[case::word(Granularity::Word, "b", "x")]
#[case::line(Granularity::Line, "a b", "a x")]
fn test_word_vs_line_granularity(
    #[case] granularity: Granularity,
    #[case] removed: &str,
    #[case] added: &str,
) {
    let options = CompareOptions::default().with_granularity(granularity);
    let result = compare(&plain("a b\nc d"), &plain("a x\nc d"), &options);
    let changes: Vec<_> = result.changes().collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, SegmentKind::Replaced);
    assert_eq!(changes[0].reference.text, removed);
    assert_eq!(changes[0].comparison.text, added);
}

#[rstest]
#[case::filtered(true, vec![SegmentKind::Equal])]
#[case::unfiltered(false, vec![SegmentKind::Deleted, SegmentKind::Equal])]
fn test_page_marker_filtering(#[case] filter: bool, #[case] expected: Vec<SegmentKind>) {
    let options = CompareOptions::default()
        .filter_boilerplate(filter)
        .with_granularity(Granularity::Line);
    assert_eq!(
        kinds("Page 1 of 5\nSummary table", "Summary table", &options),
        expected
    );
}

#[rstest]
#[case::defaults(CompareOptions::default())]
#[case::lines(CompareOptions::default().with_granularity(Granularity::Line))]
#[case::everything_folded(
    CompareOptions::default().ignore_case(true).ignore_punctuation(true)
)]
#[case::raw(CompareOptions::default().filter_boilerplate(false).normalize_whitespace(false))]
fn test_identical_input(#[case] options: CompareOptions) {
    let text = plain("CONFIDENTIAL\nMean (SD): 42.5 (3.1)\n\n  N = 120  \nPage 2 of 9");
    assert!(compare(&text, &text, &options).identical);
}

#[test]
fn test_group_balance() {
    let balanced = extract(br"{\rtf1 {\b bold} text}").unwrap();
    assert_eq!(balanced.text.as_str(), "bold text");
    assert!(!balanced.is_malformed());

    let unclosed = extract(br"{\rtf1 {\b bold} text").unwrap();
    assert_eq!(unclosed.text.as_str(), "bold text");
    assert!(unclosed.is_malformed());

    let result = compare(&balanced.text, &unclosed.text, &CompareOptions::default());
    assert!(result.identical);
}

#[test]
fn test_formatting_is_not_a_difference() {
    let result = compare(
        &rtf(r"{\rtf1\ansi {\b Adverse} events\par Total: 12}"),
        &rtf(r"{\rtf1\ansi\deff0{\fonttbl{\f0 Arial;}}\f0 Adverse {\i events}\par Total: 12}"),
        &CompareOptions::default(),
    );
    assert!(result.identical);
}

#[test]
fn test_punctuation_folding() {
    let reference = plain("Result: positive.");
    let comparison = plain("Result positive");
    assert!(!compare(&reference, &comparison, &CompareOptions::default()).identical);
    let options = CompareOptions::default().ignore_punctuation(true);
    assert!(compare(&reference, &comparison, &options).identical);
}

#[test]
fn test_segments_trace_back_to_rtf_source() {
    let source = r"{\rtf1 alpha beta gamma}";
    let result = compare(
        &rtf(source),
        &rtf(r"{\rtf1 alpha delta gamma}"),
        &CompareOptions::default(),
    );
    let change = result.changes().next().unwrap();
    let span = change.reference.source.clone().unwrap();
    assert_eq!(&source[span], "beta");
}

#[test]
fn test_listing_runs_differ_only_in_values() {
    let reference = fixture("demographics_run1.rtf");
    let comparison = fixture("demographics_run2.rtf");
    let report = compare_all(&reference, &[comparison], &BatchOptions::default()).unwrap();

    let file = &report.files[0];
    assert!(!file.result.identical);
    let changes: Vec<_> = file.result.changes().collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, SegmentKind::Replaced);
    assert_eq!(changes[0].reference.text, "42.5");
    assert_eq!(changes[0].comparison.text, "43.1");
    assert_eq!(report.summary.total_changes, 1);
}

#[test]
fn test_listing_runs_with_boilerplate_kept() {
    let reference = fixture("demographics_run1.rtf");
    let comparison = fixture("demographics_run2.rtf");
    let mut options = BatchOptions::default();
    options.compare = options
        .compare
        .filter_boilerplate(false)
        .with_granularity(Granularity::Line);
    let report = compare_all(&reference, &[comparison], &options).unwrap();
    let changed: Vec<_> = report.files[0]
        .result
        .changes()
        .map(|segment| segment.reference.text.as_str())
        .collect();
    assert_eq!(
        changed,
        vec!["Age\t42.5\t", "Generated on: 2024-01-01 12:00:00"]
    );
}
