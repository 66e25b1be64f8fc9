//! Boilerplate filtering
//!
//!     Report generators stamp every page with text that says nothing about the
//!     content: product banners, confidentiality markers, program paths, run
//!     timestamps, page numbers. Two runs of the same program differ in exactly
//!     these lines, so they are removed before comparison.
//!
//!     Rules are data: a [`BoilerplateRule`] pairs an id and a family with a
//!     regex that must match a whole line (surrounding whitespace allowed, case
//!     ignored). The built-in table lives in [`rules`]; callers can add their own
//!     patterns or load them from a YAML file. Matching lines are dropped
//!     entirely, blank lines are always kept, so filtering twice changes nothing.

pub mod rules;

use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::BoilerplateError;
use crate::text::ExtractedText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoilerplateFamily {
    VersionBanner,
    Confidentiality,
    ProgramReference,
    Timestamp,
    PageMarker,
    Caption,
    Separator,
    Metadata,
    Custom,
}

impl fmt::Display for BoilerplateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoilerplateFamily::VersionBanner => "version-banner",
            BoilerplateFamily::Confidentiality => "confidentiality",
            BoilerplateFamily::ProgramReference => "program-reference",
            BoilerplateFamily::Timestamp => "timestamp",
            BoilerplateFamily::PageMarker => "page-marker",
            BoilerplateFamily::Caption => "caption",
            BoilerplateFamily::Separator => "separator",
            BoilerplateFamily::Metadata => "metadata",
            BoilerplateFamily::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A named whole-line matcher.
#[derive(Debug, Clone)]
pub struct BoilerplateRule {
    pub id: String,
    pub family: BoilerplateFamily,
    matcher: Regex,
}

impl BoilerplateRule {
    pub fn new(
        id: impl Into<String>,
        family: BoilerplateFamily,
        pattern: &str,
    ) -> Result<Self, BoilerplateError> {
        let id = id.into();
        let anchored = format!(r"(?i)^\s*(?:{pattern})\s*$");
        let matcher = Regex::new(&anchored).map_err(|e| BoilerplateError::InvalidPattern {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            id,
            family,
            matcher,
        })
    }

    pub fn matches(&self, line: &str) -> bool {
        self.matcher.is_match(line)
    }
}

/// Pattern entries accepted in a YAML pattern file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternEntry {
    Plain(String),
    Named { id: String, pattern: String },
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    #[serde(default)]
    boilerplate_patterns: Vec<PatternEntry>,
}

#[derive(Debug, Clone)]
pub struct BoilerplateFilter {
    rules: Vec<BoilerplateRule>,
}

impl Default for BoilerplateFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BoilerplateFilter {
    /// A filter with every built-in rule.
    pub fn new() -> Self {
        Self {
            rules: rules::BUILTIN_RULES.clone(),
        }
    }

    /// A filter with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a caller-defined rule in the [`BoilerplateFamily::Custom`] family.
    pub fn with_pattern(
        mut self,
        id: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, BoilerplateError> {
        self.rules
            .push(BoilerplateRule::new(id, BoilerplateFamily::Custom, pattern)?);
        Ok(self)
    }

    /// Add unnamed custom patterns, numbering their ids.
    pub fn with_patterns<I, S>(self, patterns: I) -> Result<Self, BoilerplateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .enumerate()
            .try_fold(self, |filter, (index, pattern)| {
                filter.with_pattern(format!("custom-{}", index + 1), pattern.as_ref())
            })
    }

    /// Add the patterns listed in a YAML document under `boilerplate_patterns`.
    pub fn with_yaml(mut self, yaml: &str) -> Result<Self, BoilerplateError> {
        let file: PatternFile = serde_yaml::from_str(yaml)
            .map_err(|e| BoilerplateError::PatternFile(e.to_string()))?;
        for (index, entry) in file.boilerplate_patterns.into_iter().enumerate() {
            self = match entry {
                PatternEntry::Plain(pattern) => {
                    self.with_pattern(format!("file-{}", index + 1), &pattern)?
                }
                PatternEntry::Named { id, pattern } => self.with_pattern(id, &pattern)?,
            };
        }
        Ok(self)
    }

    /// Like [`with_yaml`](Self::with_yaml), reading the document from disk.
    pub fn with_yaml_file(self, path: impl AsRef<Path>) -> Result<Self, BoilerplateError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| BoilerplateError::PatternFile(format!("{}: {}", path.display(), e)))?;
        self.with_yaml(&yaml)
    }

    pub fn rules(&self) -> &[BoilerplateRule] {
        &self.rules
    }

    /// The first rule matching `line`. Blank lines never match.
    pub fn matching_rule(&self, line: &str) -> Option<&BoilerplateRule> {
        if line.trim().is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(line))
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.matching_rule(line).is_some()
    }

    /// Copy of `text` without its boilerplate lines.
    ///
    /// With `enabled == false` the text is returned unchanged.
    pub fn filter(&self, text: &ExtractedText, enabled: bool) -> ExtractedText {
        if !enabled {
            return text.clone();
        }
        let mut removed = 0usize;
        let filtered = text.retain_lines(|line| {
            let boilerplate = self.is_boilerplate(line);
            if boilerplate {
                removed += 1;
            }
            !boilerplate
        });
        tracing::debug!(removed, "filtered boilerplate lines");
        filtered
    }
}
