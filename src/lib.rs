//! # rtfdiff
//!
//! Extracts plain text from RTF documents and compares a reference document
//! against one or more others after filtering report boilerplate and folding
//! case, punctuation and whitespace.
//!
//! ## Pipeline
//!
//!     raw bytes -> [`rtf`] tokenizer and extractor -> [`text::ExtractedText`]
//!               -> [`boilerplate`] filter -> [`normalize`] -> [`diff`]
//!               -> [`report`]
//!
//! The two entry points most callers need are [`extract`] and [`compare`].
//! [`batch::compare_all`] runs a whole reference-versus-many comparison and
//! returns the [`report::Report`] a renderer consumes.

pub mod batch;
pub mod boilerplate;
pub mod compare;
pub mod diff;
pub mod error;
pub mod normalize;
pub mod options;
pub mod report;
pub mod rtf;
pub mod text;

pub use batch::{compare_all, BatchOptions, BatchRunner, NamedDocument};
pub use boilerplate::{BoilerplateFamily, BoilerplateFilter, BoilerplateRule};
pub use compare::{compare, Comparer};
pub use diff::{ComparisonResult, DiffCounts, DiffSegment, SegmentKind, Side};
pub use error::{BoilerplateError, CompareError, RtfError};
pub use options::{
    BatchLimits, CompareOptions, DiffAlgorithm, DiffOptions, ExtractionLimits, Granularity,
    NormalizeOptions,
};
pub use report::{ExtractionStatus, FileIdentity, FileReport, Report, Summary};
pub use rtf::{extract, Extraction, Malformed, RawDocument};
pub use text::ExtractedText;
