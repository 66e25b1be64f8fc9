//! One reference against many comparison documents
//!
//! Ceilings are checked for every file before any extraction starts, so a
//! batch either runs completely or fails without doing work. The reference is
//! extracted and normalized once; each comparison file is then an independent
//! unit of work on the rayon pool. Results keep the order the files were given.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::boilerplate::BoilerplateFilter;
use crate::compare::Comparer;
use crate::error::CompareError;
use crate::options::{BatchLimits, CompareOptions, ExtractionLimits};
use crate::report::{build_report, ExtractionStatus, FileIdentity, FileReport, Report};
use crate::rtf::{Extraction, Extractor, RawDocument};

/// A document together with the name it is reported under.
#[derive(Debug, Clone)]
pub struct NamedDocument {
    pub name: String,
    pub document: RawDocument,
}

impl NamedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            document: RawDocument::new(bytes),
        }
    }

    fn identity(&self) -> FileIdentity {
        FileIdentity::new(self.name.clone(), self.document.len())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub compare: CompareOptions,
    pub extraction: ExtractionLimits,
    pub limits: BatchLimits,
}

#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    comparer: Comparer,
    extractor: Extractor,
    limits: BatchLimits,
}

impl BatchRunner {
    pub fn new(options: &BatchOptions) -> Self {
        Self {
            comparer: Comparer::new(options.compare),
            extractor: Extractor::new(options.extraction),
            limits: options.limits,
        }
    }

    pub fn with_filter(mut self, filter: BoilerplateFilter) -> Self {
        self.comparer = self.comparer.with_filter(filter);
        self
    }

    /// Check the batch ceilings without extracting anything.
    pub fn check_limits(
        &self,
        reference: &NamedDocument,
        comparisons: &[NamedDocument],
    ) -> Result<(), CompareError> {
        if comparisons.is_empty() {
            return Err(CompareError::NoComparisonFiles);
        }
        if comparisons.len() > self.limits.max_comparison_files {
            return Err(CompareError::TooManyFiles {
                count: comparisons.len(),
                max: self.limits.max_comparison_files,
            });
        }
        std::iter::once(reference)
            .chain(comparisons)
            .try_for_each(|file| {
                file.document
                    .ensure_within(self.limits.max_file_bytes)
                    .map_err(|source| CompareError::Document {
                        file: file.name.clone(),
                        source,
                    })
            })
    }

    pub fn run(
        &self,
        reference: &NamedDocument,
        comparisons: &[NamedDocument],
    ) -> Result<Report, CompareError> {
        self.check_limits(reference, comparisons)?;

        let reference_extraction = self.extract(reference)?;
        let prepared = self.comparer.prepare(&reference_extraction.text);

        let files = comparisons
            .par_iter()
            .map(|file| {
                let extraction = self.extract(file)?;
                let result = self.comparer.compare_prepared(
                    &prepared,
                    &self.comparer.prepare(&extraction.text),
                );
                Ok(FileReport {
                    identity: file.identity(),
                    extraction: ExtractionStatus::of(&extraction),
                    result,
                })
            })
            .collect::<Result<Vec<_>, CompareError>>()?;

        let report = build_report(
            reference.identity(),
            ExtractionStatus::of(&reference_extraction),
            files,
        );
        tracing::info!(
            files = report.summary.files_compared,
            different = report.summary.different_files,
            "batch comparison finished"
        );
        Ok(report)
    }

    fn extract(&self, file: &NamedDocument) -> Result<Extraction, CompareError> {
        self.extractor
            .extract(&file.document)
            .map_err(|source| CompareError::Document {
                file: file.name.clone(),
                source,
            })
    }
}

/// Compare every document in `comparisons` against `reference`.
pub fn compare_all(
    reference: &NamedDocument,
    comparisons: &[NamedDocument],
    options: &BatchOptions,
) -> Result<Report, CompareError> {
    BatchRunner::new(options).run(reference, comparisons)
}
