//! Configuration loader for rtfdiff.
//!
//! `defaults/rtfdiff.default.toml` is embedded into the binary so the documented
//! defaults and the runtime defaults cannot drift apart. Callers layer a user
//! file and individual overrides on top with [`Loader`] and deserialize into
//! [`RtfDiffConfig`], whose sections map directly onto the option structs of
//! the core library.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use rtfdiff::{
    BatchLimits, BatchOptions, BoilerplateError, BoilerplateFilter, CompareOptions, DiffOptions,
    ExtractionLimits, NormalizeOptions,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/rtfdiff.default.toml");

/// Top-level configuration consumed by rtfdiff applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RtfDiffConfig {
    pub normalization: NormalizeOptions,
    pub boilerplate: BoilerplateConfig,
    pub diff: DiffOptions,
    pub extraction: ExtractionLimits,
    pub limits: BatchLimits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoilerplateConfig {
    pub enabled: bool,
    #[serde(default)]
    pub extra_patterns: Vec<String>,
    #[serde(default)]
    pub pattern_file: Option<PathBuf>,
}

impl RtfDiffConfig {
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            filter_boilerplate: self.boilerplate.enabled,
            normalize: self.normalization,
            diff: self.diff,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            compare: self.compare_options(),
            extraction: self.extraction,
            limits: self.limits,
        }
    }

    /// Built-in rules plus `extra_patterns` and the pattern file, if any.
    pub fn boilerplate_filter(&self) -> Result<BoilerplateFilter, BoilerplateError> {
        let filter = BoilerplateFilter::new().with_patterns(&self.boilerplate.extra_patterns)?;
        match &self.boilerplate.pattern_file {
            Some(path) => filter.with_yaml_file(path),
            None => Ok(filter),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer configuration given as TOML text.
    pub fn with_toml_str(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<RtfDiffConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RtfDiffConfig, ConfigError> {
    Loader::new().build()
}
