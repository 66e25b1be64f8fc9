//! Option structs consumed by the pipeline stages.
//!
//! All of them deserialize from the `rtfdiff-config` TOML layout and default
//! to the values the comparison tool ships with.

use serde::{Deserialize, Serialize};

/// The comparison atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    #[default]
    Word,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub ignore_case: bool,
    pub ignore_punctuation: bool,
    pub normalize_whitespace: bool,
    pub granularity: Granularity,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            ignore_punctuation: false,
            normalize_whitespace: true,
            granularity: Granularity::Word,
        }
    }
}

/// Sequence alignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffAlgorithm {
    /// Longest common subsequence with earliest-match tie-breaking.
    #[default]
    Lcs,
    Myers,
    Patience,
}

impl From<DiffAlgorithm> for similar::Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Lcs => similar::Algorithm::Lcs,
            DiffAlgorithm::Myers => similar::Algorithm::Myers,
            DiffAlgorithm::Patience => similar::Algorithm::Patience,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub algorithm: DiffAlgorithm,
    /// Largest reference x comparison table the LCS algorithm may build
    /// before the engine switches to Myers.
    pub lcs_cell_limit: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::Lcs,
            lcs_cell_limit: 4_000_000,
        }
    }
}

/// Everything `compare` needs besides the two texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub filter_boilerplate: bool,
    pub normalize: NormalizeOptions,
    pub diff: DiffOptions,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            filter_boilerplate: true,
            normalize: NormalizeOptions::default(),
            diff: DiffOptions::default(),
        }
    }
}

impl CompareOptions {
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.normalize.granularity = granularity;
        self
    }

    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.normalize.ignore_case = ignore;
        self
    }

    pub fn ignore_punctuation(mut self, ignore: bool) -> Self {
        self.normalize.ignore_punctuation = ignore;
        self
    }

    pub fn normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize.normalize_whitespace = normalize;
        self
    }

    pub fn filter_boilerplate(mut self, filter: bool) -> Self {
        self.filter_boilerplate = filter;
        self
    }
}

/// Bounds on the work a single extraction may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    pub max_depth: usize,
    pub max_tokens: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_tokens: 5_000_000,
        }
    }
}

/// Ceilings checked before any document is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchLimits {
    pub max_file_bytes: usize,
    pub max_comparison_files: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 15 * 1024 * 1024,
            max_comparison_files: 20,
        }
    }
}
