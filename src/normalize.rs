//! Normalization into comparable units
//!
//! A [`NormalizedSequence`] splits an [`ExtractedText`] into words or lines and
//! derives a comparison key for each one. The key is what the diff engine
//! compares; the unit's span points back into the shared text buffer so the
//! original wording is what gets displayed. Units stay in document order.

use std::ops::Range;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::{Granularity, NormalizeOptions};
use crate::text::ExtractedText;

/// Unicode punctuation and symbols, the characters `ignore_punctuation` drops.
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{P}\p{S}]").expect("punctuation class"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace class"));

/// One comparable atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUnit {
    /// Comparison key after case, punctuation and whitespace folding.
    pub key: String,
    /// Byte range of the original unit in the text buffer.
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct NormalizedSequence {
    text: Arc<ExtractedText>,
    units: Vec<NormalizedUnit>,
}

impl NormalizedSequence {
    pub fn units(&self) -> &[NormalizedUnit] {
        &self.units
    }

    pub fn keys(&self) -> Vec<&str> {
        self.units.iter().map(|unit| unit.key.as_str()).collect()
    }

    pub fn text(&self) -> &ExtractedText {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Byte range in the text buffer covered by a range of units.
    pub fn text_span(&self, units: Range<usize>) -> Option<Range<usize>> {
        if units.is_empty() {
            return None;
        }
        let first = self.units.get(units.start)?;
        let last = self.units.get(units.end - 1)?;
        Some(first.span.start..last.span.end)
    }

    /// Original text of a range of units, including the separators between
    /// them exactly as they appear in the document.
    pub fn original(&self, units: Range<usize>) -> &str {
        match self.text_span(units) {
            Some(span) => &self.text.as_str()[span],
            None => "",
        }
    }

    /// Source byte range in the RTF document of a range of units.
    pub fn source_span(&self, units: Range<usize>) -> Option<Range<usize>> {
        self.text_span(units)
            .and_then(|span| self.text.source_span(span))
    }
}

/// Split `text` into units and derive their comparison keys.
pub fn normalize(text: Arc<ExtractedText>, options: &NormalizeOptions) -> NormalizedSequence {
    let spans = match options.granularity {
        Granularity::Word => word_spans(text.as_str()),
        Granularity::Line => line_spans(&text),
    };
    let units = spans
        .into_iter()
        .filter_map(|span| {
            comparison_key(&text.as_str()[span.clone()], options)
                .map(|key| NormalizedUnit { key, span })
        })
        .collect();
    NormalizedSequence { text, units }
}

fn word_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (index, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(begin)) => {
                spans.push(begin..index);
                start = None;
            }
            (false, None) => start = Some(index),
            _ => {}
        }
    }
    if let Some(begin) = start {
        spans.push(begin..text.len());
    }
    spans
}

fn line_spans(text: &ExtractedText) -> Vec<Range<usize>> {
    let source = text.as_str();
    text.lines()
        .into_iter()
        .map(|line| {
            let content = source[line.clone()].trim_end_matches(['\n', '\r']);
            line.start..line.start + content.len()
        })
        .collect()
}

/// `None` when the unit has content that punctuation removal erased.
fn comparison_key(raw: &str, options: &NormalizeOptions) -> Option<String> {
    let mut key = if options.ignore_case {
        caseless::default_case_fold_str(raw)
    } else {
        raw.to_string()
    };
    if options.ignore_punctuation {
        let stripped = PUNCTUATION.replace_all(&key, "");
        if stripped.trim().is_empty() && !key.trim().is_empty() {
            return None;
        }
        key = stripped.into_owned();
    }
    if options.normalize_whitespace {
        key = WHITESPACE.replace_all(key.trim(), " ").into_owned();
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str, options: NormalizeOptions) -> Vec<String> {
        normalize(Arc::new(ExtractedText::from_plain(text)), &options)
            .units()
            .iter()
            .map(|unit| unit.key.clone())
            .collect()
    }

    fn lines() -> NormalizeOptions {
        NormalizeOptions {
            granularity: Granularity::Line,
            ..NormalizeOptions::default()
        }
    }

    #[test]
    fn test_word_units() {
        assert_eq!(
            keys("  Hello,\tbig  world\n", NormalizeOptions::default()),
            vec!["Hello,", "big", "world"]
        );
    }

    #[test]
    fn test_line_units_keep_blank_lines() {
        assert_eq!(keys("a  b\n\nc\r\n", lines()), vec!["a b", "", "c"]);
    }

    #[test]
    fn test_whitespace_kept_when_not_normalizing() {
        let options = NormalizeOptions {
            normalize_whitespace: false,
            ..lines()
        };
        assert_eq!(keys(" a  b ", options), vec![" a  b "]);
    }

    #[test]
    fn test_ignore_case_only_changes_keys() {
        let options = NormalizeOptions {
            ignore_case: true,
            ..NormalizeOptions::default()
        };
        let seq = normalize(Arc::new(ExtractedText::from_plain("Hello World")), &options);
        assert_eq!(seq.keys(), vec!["hello", "world"]);
        assert_eq!(seq.original(0..2), "Hello World");
    }

    #[test]
    fn test_ignore_case_uses_full_case_folding() {
        let options = NormalizeOptions {
            ignore_case: true,
            ..NormalizeOptions::default()
        };
        assert_eq!(keys("STRASSE straße", options), vec!["strasse", "strasse"]);
        assert_eq!(keys("ΣΟΦΟΣ σοφος", options), vec!["σοφοσ", "σοφοσ"]);
    }

    #[test]
    fn test_ignore_punctuation_drops_emptied_units() {
        let options = NormalizeOptions {
            ignore_punctuation: true,
            ..NormalizeOptions::default()
        };
        assert_eq!(keys("Yes , no - (maybe).", options), vec!["Yes", "no", "maybe"]);

        let options = NormalizeOptions {
            ignore_punctuation: true,
            ..lines()
        };
        assert_eq!(keys("a.\n---\n\nb", options), vec!["a", "", "b"]);
    }

    #[test]
    fn test_original_and_source_spans() {
        let mut text = ExtractedText::new();
        text.push("alpha ", 10..16);
        text.push("beta", 40..44);
        let seq = normalize(Arc::new(text), &NormalizeOptions::default());
        assert_eq!(seq.original(0..2), "alpha beta");
        assert_eq!(seq.original(1..1), "");
        assert_eq!(seq.source_span(1..2), Some(40..44));
        assert_eq!(seq.source_span(0..2), Some(10..44));
    }
}
