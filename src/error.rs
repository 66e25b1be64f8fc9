//! Error types shared across the extraction and comparison pipeline.
//!
//! Only conditions that stop work entirely are errors. Structurally broken RTF
//! and unmappable characters are reported as data on a successful
//! [`Extraction`](crate::rtf::Extraction) instead, see
//! [`Malformed`](crate::rtf::Malformed) and [`Diagnostic`](crate::rtf::Diagnostic).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RtfError {
    /// The input does not start with the `{\rtf` signature.
    #[error("invalid RTF signature: expected '{{\\rtf' prefix, found {found:?}")]
    InvalidFormat { found: String },

    #[error("document too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoilerplateError {
    #[error("invalid boilerplate pattern '{id}': {reason}")]
    InvalidPattern { id: String, reason: String },

    #[error("could not read boilerplate pattern file: {0}")]
    PatternFile(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("{file}: {source}")]
    Document {
        file: String,
        #[source]
        source: RtfError,
    },

    #[error("too many comparison files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("at least one comparison file is required")]
    NoComparisonFiles,

    #[error(transparent)]
    Boilerplate(#[from] BoilerplateError),
}

pub type Result<T> = std::result::Result<T, RtfError>;
