//! RTF reading: raw bytes to tokens to plain text
//!
//! The pipeline is [`RawDocument`] -> [`Tokenizer`] -> [`Extractor`] ->
//! [`ExtractedText`](crate::text::ExtractedText). Only the signature check can
//! fail; everything after it recovers as much text as it can and reports what
//! went wrong alongside the result.

pub mod codepage;
pub mod destinations;
pub mod document;
pub mod extractor;
pub mod tokenizer;
pub mod tokens;

pub use document::{ByteOffsets, RawDocument, RTF_SIGNATURE};
pub use extractor::{
    extract, Diagnostic, DiagnosticKind, Extraction, Extractor, Malformed, MalformedKind,
};
pub use tokenizer::{tokenize, Spanned, Tokenizer};
pub use tokens::{ControlWord, Token};
