//! Extracted text with source traceability
//!
//!     [`ExtractedText`] is a single owned text buffer plus an ordered list of
//!     segments. Each segment maps a byte range of the buffer back to the byte
//!     range of the RTF source it was decoded from. Everything downstream (the
//!     boilerplate filter, the normalizer, the diff engine) refers to this
//!     buffer by index ranges only, so the buffer is the one place original
//!     text lives.
//!
//!     Verbatim segments (literal text copied byte for byte) map sub-ranges
//!     exactly. A segment produced by an escape such as `\'e9` or `\par` has a
//!     different length in the source than in the buffer, so any part of it
//!     maps to its whole source span.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// Byte range in the text buffer.
    pub text: Range<usize>,
    /// Byte range in the RTF source.
    pub source: Range<usize>,
}

impl TextSegment {
    /// Whether the text was copied from the source unchanged.
    pub fn is_verbatim(&self) -> bool {
        self.text.len() == self.source.len()
    }

    /// Source range of the part of this segment that overlaps `range`.
    fn map(&self, range: &Range<usize>) -> Range<usize> {
        if !self.is_verbatim() {
            return self.source.clone();
        }
        let start = range.start.clamp(self.text.start, self.text.end) - self.text.start;
        let end = range.end.clamp(self.text.start, self.text.end) - self.text.start;
        self.source.start + start..self.source.start + end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    segments: Vec<TextSegment>,
}

impl ExtractedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap plain text as a single segment whose source is the text itself.
    pub fn from_plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut extracted = Self::new();
        if !text.is_empty() {
            let len = text.len();
            extracted.text = text;
            extracted.segments.push(TextSegment {
                text: 0..len,
                source: 0..len,
            });
        }
        extracted
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append decoded text read from `source`.
    ///
    /// A verbatim piece whose source continues a verbatim previous segment is
    /// merged into it.
    pub fn push(&mut self, piece: &str, source: Range<usize>) {
        if piece.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(piece);
        let end = self.text.len();
        if let Some(last) = self.segments.last_mut() {
            if last.is_verbatim()
                && piece.len() == source.len()
                && last.text.end == start
                && last.source.end == source.start
            {
                last.text.end = end;
                last.source.end = source.end;
                return;
            }
        }
        self.segments.push(TextSegment {
            text: start..end,
            source,
        });
    }

    /// Source span covering every segment that overlaps `range`.
    pub fn source_span(&self, range: Range<usize>) -> Option<Range<usize>> {
        let mut overlapping = self
            .segments
            .iter()
            .filter(|seg| overlaps(&seg.text, &range));
        let first = overlapping.next()?.map(&range);
        let span = overlapping.fold(first, |acc, seg| {
            let mapped = seg.map(&range);
            acc.start.min(mapped.start)..acc.end.max(mapped.end)
        });
        Some(span)
    }

    /// Byte ranges of each line, including its trailing newline if any.
    pub fn lines(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut offset = 0;
        for line in self.text.split_inclusive('\n') {
            ranges.push(offset..offset + line.len());
            offset += line.len();
        }
        ranges
    }

    /// Copy of this text with every source offset passed through `to_raw`.
    ///
    /// Verbatim segments are split per character, so a character whose
    /// source shrinks to a single byte still maps to exactly that byte.
    pub fn map_sources<F>(&self, to_raw: F) -> ExtractedText
    where
        F: Fn(usize) -> usize,
    {
        let mut mapped = ExtractedText::new();
        for seg in &self.segments {
            let piece = &self.text[seg.text.clone()];
            if !seg.is_verbatim() {
                mapped.push(piece, to_raw(seg.source.start)..to_raw(seg.source.end));
                continue;
            }
            for (offset, c) in piece.char_indices() {
                let end = offset + c.len_utf8();
                let source = seg.source.start + offset..seg.source.start + end;
                mapped.push(&piece[offset..end], to_raw(source.start)..to_raw(source.end));
            }
        }
        mapped
    }

    /// Copy of this text keeping only the lines `keep` accepts.
    ///
    /// `keep` sees each line without its trailing newline. Kept lines retain
    /// their source mapping.
    pub fn retain_lines<F>(&self, mut keep: F) -> ExtractedText
    where
        F: FnMut(&str) -> bool,
    {
        let mut kept = ExtractedText::new();
        for line in self.lines() {
            let content = self.text[line.clone()].trim_end_matches('\n');
            if !keep(content) {
                continue;
            }
            for seg in self.segments.iter().filter(|seg| overlaps(&seg.text, &line)) {
                let start = seg.text.start.max(line.start);
                let end = seg.text.end.min(line.end);
                kept.push(&self.text[start..end], seg.map(&(start..end)));
            }
        }
        kept
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

impl std::fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
