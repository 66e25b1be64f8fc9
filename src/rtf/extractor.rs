//! Token stream to plain text
//!
//!     The extractor walks the flat token stream once with an explicit stack of
//!     group states instead of building a tree. `{` pushes a copy of the current
//!     state, `}` pops it, so destinations and the `\uc` skip count are inherited
//!     by nested groups and restored when they close.
//!
//!     Text is only emitted while the innermost state is a text destination.
//!     Metadata destinations (font table, field instructions, pictures, ...) flip
//!     the current group to skipping; everything nested in it is dropped until
//!     the group closes.
//!
//!     Broken structure never fails the extraction. An unbalanced `}` stops it,
//!     unclosed groups are noticed at the end, and a `\'` escape cut short is
//!     dropped where it stands. In every case the text recovered so far is
//!     returned with a [`Malformed`] report attached. Only the first problem is
//!     reported, unless a later one stops the extraction.

use std::borrow::Cow;
use std::ops::Range;

use serde::Serialize;

use super::codepage::{self, DEFAULT_CODE_PAGE};
use super::destinations::{
    charset_code_page, is_skipped_destination, special_character, symbol_character,
};
use super::document::{ByteOffsets, RawDocument};
use super::tokenizer::Tokenizer;
use super::tokens::{ControlWord, Token};
use crate::error::Result;
use crate::options::ExtractionLimits;
use crate::text::ExtractedText;

const REPLACEMENT: &str = "\u{fffd}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MalformedKind {
    /// A `}` with no open group.
    UnbalancedClose,
    /// Input ended with groups still open.
    UnclosedGroups { open: usize },
    /// A `\'` escape with fewer than two hex digits.
    UnterminatedEscape,
    NestingTooDeep { max: usize },
    TooManyTokens { max: usize },
}

/// Structural problem that cut the extraction short or left it incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Malformed {
    #[serde(flatten)]
    pub kind: MalformedKind,
    pub offset: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Bytes that formed no valid token and were dropped.
    InvalidEscape,
    /// Escaped bytes the active code page cannot map.
    UnsupportedEncoding { code_page: u16 },
    /// A `\u` escape that is not a valid scalar value.
    UnsupportedUnicode { value: i32 },
}

/// Recoverable problem; the affected text became U+FFFD or was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub offset: usize,
    pub depth: usize,
}

/// Result of extracting one document.
///
/// Source spans and offsets are byte offsets into the document as given, also
/// when it was decoded as Windows-1252 for tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: ExtractedText,
    pub code_page: u16,
    pub malformed: Option<Malformed>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn is_malformed(&self) -> bool {
        self.malformed.is_some()
    }

    fn into_raw_offsets(self, offsets: &ByteOffsets) -> Self {
        Self {
            text: self.text.map_sources(|offset| offsets.raw(offset)),
            malformed: self.malformed.map(|malformed| Malformed {
                offset: offsets.raw(malformed.offset),
                ..malformed
            }),
            diagnostics: self
                .diagnostics
                .into_iter()
                .map(|diagnostic| Diagnostic {
                    offset: offsets.raw(diagnostic.offset),
                    ..diagnostic
                })
                .collect(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Text,
    Skip,
}

#[derive(Debug, Clone, Copy)]
struct GroupState {
    destination: Destination,
    /// Fallback characters following each `\uN`.
    uc: usize,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            destination: Destination::Text,
            uc: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    limits: ExtractionLimits,
}

impl Extractor {
    pub fn new(limits: ExtractionLimits) -> Self {
        Self { limits }
    }

    /// Extract a document, rejecting input without the RTF signature.
    pub fn extract(&self, document: &RawDocument) -> Result<Extraction> {
        document.ensure_valid()?;
        let source = document.source();
        let extraction = self.extract_source(&source);
        Ok(match &source {
            Cow::Borrowed(_) => extraction,
            Cow::Owned(decoded) => extraction.into_raw_offsets(&ByteOffsets::new(decoded)),
        })
    }

    /// Extract from already-decoded source text. No signature check.
    pub fn extract_source(&self, source: &str) -> Extraction {
        let mut run = Run::new(self.limits);
        let mut tokens = Tokenizer::new(source);
        let mut count = 0usize;
        let mut reported = 0usize;

        while let Some((token, span)) = tokens.next() {
            reported = run.report_skipped(tokens.skipped(), reported);
            count += 1;
            if count > self.limits.max_tokens {
                run.fail(
                    MalformedKind::TooManyTokens {
                        max: self.limits.max_tokens,
                    },
                    span.start,
                );
                break;
            }
            if !run.step(token, span) {
                break;
            }
        }
        run.flush_bytes();
        run.drop_high_surrogate();

        if !run.stack.is_empty() {
            let open = run.stack.len();
            run.flag(MalformedKind::UnclosedGroups { open }, source.len());
        }
        run.report_skipped(tokens.skipped(), reported);
        run.diagnostics.sort_by_key(|d| d.offset);

        if let Some(malformed) = &run.malformed {
            tracing::warn!(
                kind = ?malformed.kind,
                offset = malformed.offset,
                depth = malformed.depth,
                "malformed RTF, returning partial text"
            );
        }
        tracing::debug!(
            tokens = count,
            chars = run.out.len(),
            diagnostics = run.diagnostics.len(),
            "extracted RTF text"
        );

        Extraction {
            text: run.out,
            code_page: run.code_page,
            malformed: run.malformed,
            diagnostics: run.diagnostics,
        }
    }
}

/// Extract with default limits.
pub fn extract(raw_bytes: &[u8]) -> Result<Extraction> {
    Extractor::default().extract(&RawDocument::new(raw_bytes))
}

struct Run {
    limits: ExtractionLimits,
    stack: Vec<GroupState>,
    code_page: u16,
    out: ExtractedText,
    pending_bytes: Vec<u8>,
    pending_span: Option<Range<usize>>,
    /// Fallback characters still to drop after a `\uN`.
    fallback: usize,
    high_surrogate: Option<(u16, Range<usize>)>,
    malformed: Option<Malformed>,
    diagnostics: Vec<Diagnostic>,
}

impl Run {
    fn new(limits: ExtractionLimits) -> Self {
        Self {
            limits,
            stack: Vec::new(),
            code_page: DEFAULT_CODE_PAGE,
            out: ExtractedText::new(),
            pending_bytes: Vec::new(),
            pending_span: None,
            fallback: 0,
            high_surrogate: None,
            malformed: None,
            diagnostics: Vec::new(),
        }
    }

    fn current(&self) -> GroupState {
        self.stack.last().copied().unwrap_or_default()
    }

    /// Text outside the outermost group is never part of the document.
    fn visible(&self) -> bool {
        matches!(self.stack.last(), Some(state) if state.destination == Destination::Text)
    }

    /// Record a problem that extraction continues past.
    fn flag(&mut self, kind: MalformedKind, offset: usize) {
        if self.malformed.is_none() {
            self.fail(kind, offset);
        }
    }

    fn fail(&mut self, kind: MalformedKind, offset: usize) {
        self.malformed = Some(Malformed {
            kind,
            offset,
            depth: self.stack.len(),
        });
    }

    fn diagnose(&mut self, kind: DiagnosticKind, offset: usize) {
        self.diagnostics.push(Diagnostic {
            kind,
            offset,
            depth: self.stack.len(),
        });
    }

    /// Record tokenizer rejects past `reported`, returning the new count.
    fn report_skipped(&mut self, skipped: &[Range<usize>], reported: usize) -> usize {
        for range in &skipped[reported..] {
            self.diagnose(DiagnosticKind::InvalidEscape, range.start);
        }
        skipped.len()
    }

    /// Process one token. Returns false when extraction must stop.
    fn step(&mut self, token: Token, span: Range<usize>) -> bool {
        if !matches!(token, Token::HexByte(_)) {
            self.flush_bytes();
        }

        match token {
            Token::GroupOpen => {
                if self.stack.len() >= self.limits.max_depth {
                    self.fail(
                        MalformedKind::NestingTooDeep {
                            max: self.limits.max_depth,
                        },
                        span.start,
                    );
                    return false;
                }
                self.fallback = 0;
                self.drop_high_surrogate();
                let state = self.current();
                self.stack.push(state);
            }
            Token::GroupClose => {
                self.fallback = 0;
                self.drop_high_surrogate();
                if self.stack.pop().is_none() {
                    self.fail(MalformedKind::UnbalancedClose, span.start);
                    return false;
                }
            }
            Token::ControlWord(word) => self.control_word(word, span),
            Token::ControlSymbol(symbol) => self.control_symbol(symbol, span),
            Token::HexByte(byte) => {
                if self.take_fallback(1) == 1 || !self.visible() {
                    return true;
                }
                self.pending_bytes.push(byte);
                self.pending_span = Some(match self.pending_span.take() {
                    Some(pending) => pending.start..span.end,
                    None => span,
                });
            }
            Token::UnterminatedHex => {
                self.take_fallback(1);
                self.flag(MalformedKind::UnterminatedEscape, span.start);
            }
            Token::Text(text) => {
                if !self.visible() {
                    self.take_fallback(text.chars().count());
                    return true;
                }
                let skip = self.take_fallback(text.chars().count());
                let cut = text
                    .char_indices()
                    .nth(skip)
                    .map_or(text.len(), |(index, _)| index);
                self.emit(&text[cut..], span.start + cut..span.end);
            }
        }
        true
    }

    fn control_word(&mut self, word: ControlWord, span: Range<usize>) {
        let ControlWord { name, param } = word;

        if let Some(code_page) = charset_code_page(&name) {
            self.code_page = code_page;
            return;
        }
        match name.as_str() {
            "ansicpg" => {
                if let Some(code_page) = param.and_then(|p| u16::try_from(p).ok()) {
                    self.code_page = code_page;
                }
                return;
            }
            "uc" => {
                if let Some(state) = self.stack.last_mut() {
                    state.uc = param.map_or(1, |p| p.max(0) as usize);
                }
                return;
            }
            "u" => {
                if let Some(value) = param {
                    self.unicode(value, span);
                }
                return;
            }
            _ => {}
        }

        if is_skipped_destination(&name) {
            if let Some(state) = self.stack.last_mut() {
                state.destination = Destination::Skip;
            }
            return;
        }
        if let Some(text) = special_character(&name) {
            if self.visible() {
                self.emit(text, span);
            }
        }
    }

    fn control_symbol(&mut self, symbol: char, span: Range<usize>) {
        if self.take_fallback(1) == 1 {
            return;
        }
        if symbol == '*' {
            if let Some(state) = self.stack.last_mut() {
                state.destination = Destination::Skip;
            }
            return;
        }
        if let Some(text) = symbol_character(symbol) {
            if self.visible() {
                self.emit(text, span);
            }
        }
    }

    fn unicode(&mut self, value: i32, span: Range<usize>) {
        // Values above 32767 are written as negative signed 16-bit numbers.
        let unit = if value < 0 { value + 0x10000 } else { value };
        self.fallback = self.current().uc;
        if !self.visible() {
            return;
        }
        let Ok(unit) = u16::try_from(unit) else {
            self.diagnose(DiagnosticKind::UnsupportedUnicode { value }, span.start);
            self.emit(REPLACEMENT, span);
            return;
        };

        match unit {
            0xD800..=0xDBFF => {
                self.drop_high_surrogate();
                self.high_surrogate = Some((unit, span));
            }
            0xDC00..=0xDFFF => match self.high_surrogate.take() {
                Some((high, high_span)) => {
                    let decoded = char::decode_utf16([high, unit])
                        .next()
                        .and_then(|c| c.ok())
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    let mut buf = [0u8; 4];
                    self.out
                        .push(decoded.encode_utf8(&mut buf), high_span.start..span.end);
                }
                None => {
                    self.diagnose(DiagnosticKind::UnsupportedUnicode { value }, span.start);
                    self.emit(REPLACEMENT, span);
                }
            },
            _ => {
                let decoded =
                    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
                let mut buf = [0u8; 4];
                self.emit(decoded.encode_utf8(&mut buf), span);
            }
        }
    }

    /// Append visible text, first settling an unpaired high surrogate.
    fn emit(&mut self, text: &str, span: Range<usize>) {
        if text.is_empty() {
            return;
        }
        self.drop_high_surrogate();
        self.out.push(text, span);
    }

    fn drop_high_surrogate(&mut self) {
        if let Some((high, span)) = self.high_surrogate.take() {
            self.diagnose(
                DiagnosticKind::UnsupportedUnicode {
                    value: i32::from(high),
                },
                span.start,
            );
            self.out.push(REPLACEMENT, span);
        }
    }

    /// Consume up to `available` pending fallback characters, returning how
    /// many were consumed.
    fn take_fallback(&mut self, available: usize) -> usize {
        let taken = self.fallback.min(available);
        self.fallback -= taken;
        taken
    }

    fn flush_bytes(&mut self) {
        let Some(span) = self.pending_span.take() else {
            return;
        };
        let bytes = std::mem::take(&mut self.pending_bytes);
        match codepage::decode(self.code_page, &bytes) {
            Some(text) => self.emit(&text, span),
            None => {
                self.diagnose(
                    DiagnosticKind::UnsupportedEncoding {
                        code_page: self.code_page,
                    },
                    span.start,
                );
                self.emit(REPLACEMENT, span);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(source: &str) -> String {
        Extractor::default().extract_source(source).text.as_str().to_string()
    }

    #[test]
    fn test_nested_groups() {
        let extraction = Extractor::default().extract_source("{\\rtf1 {\\b bold} text}");
        assert_eq!(extraction.text.as_str(), "bold text");
        assert!(!extraction.is_malformed());
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_unclosed_group_is_malformed() {
        let extraction = Extractor::default().extract_source("{\\rtf1 {\\b bold} text");
        assert_eq!(extraction.text.as_str(), "bold text");
        assert_eq!(
            extraction.malformed,
            Some(Malformed {
                kind: MalformedKind::UnclosedGroups { open: 1 },
                offset: 21,
                depth: 1,
            })
        );
    }

    #[test]
    fn test_unbalanced_close_stops_early() {
        let extraction = Extractor::default().extract_source("{\\rtf1 kept}} lost");
        assert_eq!(extraction.text.as_str(), "kept");
        let malformed = extraction.malformed.expect("should be malformed");
        assert_eq!(malformed.kind, MalformedKind::UnbalancedClose);
        assert_eq!(malformed.offset, 12);
        assert_eq!(malformed.depth, 0);
    }

    #[test]
    fn test_unterminated_escape_is_malformed_but_continues() {
        let extraction = Extractor::default().extract_source("{\\rtf1 a\\'4}}");
        assert_eq!(extraction.text.as_str(), "a");
        assert_eq!(
            extraction.malformed,
            Some(Malformed {
                kind: MalformedKind::UnbalancedClose,
                offset: 12,
                depth: 0,
            })
        );

        let extraction = Extractor::default().extract_source("{\\rtf1 a\\'\\par b\\'e}");
        assert_eq!(extraction.text.as_str(), "a\nb");
        assert_eq!(
            extraction.malformed,
            Some(Malformed {
                kind: MalformedKind::UnterminatedEscape,
                offset: 8,
                depth: 1,
            })
        );
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_skipped_destinations() {
        let source = "{\\rtf1\\ansi\\deff0{\\fonttbl{\\f0 Times New Roman;}}\
                      {\\colortbl;\\red255\\green0\\blue0;}\
                      {\\*\\generator Writer;}\\f0 Body}";
        assert_eq!(text_of(source), "Body");
    }

    #[test]
    fn test_field_result_is_kept_instruction_dropped() {
        let source = "{\\rtf1 {\\field{\\*\\fldinst HYPERLINK \"x\"}{\\fldrslt link}} after}";
        assert_eq!(text_of(source), "link after");
    }

    #[test]
    fn test_special_characters() {
        let source = "{\\rtf1 a\\par b\\line c\\tab d\\~e\\-f\\_g\\emdash}";
        assert_eq!(text_of(source), "a\nb\nc\td\u{a0}e-f\u{2011}g\u{2014}");
    }

    #[test]
    fn test_hex_bytes_use_code_page() {
        assert_eq!(text_of("{\\rtf1\\ansi caf\\'e9}"), "café");
        assert_eq!(text_of("{\\rtf1\\ansi\\ansicpg1251 \\'c4}"), "Д");
        assert_eq!(text_of("{\\rtf1\\ansi\\ansicpg932 \\'82\\'a0}"), "あ");
    }

    #[test]
    fn test_oem_code_pages() {
        let extraction = Extractor::default().extract_source("{\\rtf1\\pc x\\'80y}");
        assert_eq!(extraction.text.as_str(), "x\u{c7}y");
        assert_eq!(extraction.code_page, 437);
        assert!(extraction.diagnostics.is_empty());
        assert_eq!(text_of("{\\rtf1\\pca \\'9b}"), "\u{f8}");
    }

    #[test]
    fn test_unsupported_code_page_degrades() {
        let extraction = Extractor::default().extract_source("{\\rtf1\\ansicpg42 x\\'80y}");
        assert_eq!(extraction.text.as_str(), "x\u{fffd}y");
        assert_eq!(extraction.code_page, 42);
        assert_eq!(
            extraction.diagnostics[0].kind,
            DiagnosticKind::UnsupportedEncoding { code_page: 42 }
        );
    }

    #[test]
    fn test_unicode_escape_discards_fallback() {
        assert_eq!(text_of("{\\rtf1 \\u8217?s}"), "\u{2019}s");
        assert_eq!(text_of("{\\rtf1 \\u8217\\'92s}"), "\u{2019}s");
        assert_eq!(text_of("{\\rtf1\\uc2 \\u8364 EUR x}"), "\u{20ac}R x");
        assert_eq!(text_of("{\\rtf1\\uc0 \\u8364 x}"), "\u{20ac}x");
    }

    #[test]
    fn test_negative_unicode_and_surrogate_pairs() {
        assert_eq!(text_of("{\\rtf1 \\u-3913?}"), "\u{f0b7}");
        assert_eq!(text_of("{\\rtf1 \\u-10179?\\u-8704?}"), "\u{1f600}");
    }

    #[test]
    fn test_unknown_control_words_are_ignored() {
        assert_eq!(text_of("{\\rtf1 \\fancynewthing42 plain}"), "plain");
    }

    #[test]
    fn test_segments_trace_to_source() {
        let source = "{\\rtf1 {\\b bold} text}";
        let extraction = Extractor::default().extract_source(source);
        let segments = extraction.text.segments();
        assert_eq!(&source[segments[0].source.clone()], "bold");
        assert_eq!(&source[segments[1].source.clone()], " text");
    }

    #[test]
    fn test_nesting_limit() {
        let extractor = Extractor::new(ExtractionLimits {
            max_depth: 2,
            ..ExtractionLimits::default()
        });
        let extraction = extractor.extract_source("{\\rtf1 a{b{c}}}");
        assert_eq!(extraction.text.as_str(), "ab");
        assert_eq!(
            extraction.malformed.map(|m| m.kind),
            Some(MalformedKind::NestingTooDeep { max: 2 })
        );
    }

    #[test]
    fn test_token_limit() {
        let extractor = Extractor::new(ExtractionLimits {
            max_tokens: 3,
            ..ExtractionLimits::default()
        });
        let extraction = extractor.extract_source("{\\rtf1 a{\\b b}}");
        assert_eq!(extraction.text.as_str(), "a");
        assert_eq!(
            extraction.malformed.map(|m| m.kind),
            Some(MalformedKind::TooManyTokens { max: 3 })
        );
    }

    #[test]
    fn test_invalid_signature_is_rejected() {
        let err = extract(b"plain text").unwrap_err();
        assert!(matches!(err, crate::error::RtfError::InvalidFormat { .. }));
    }
}
