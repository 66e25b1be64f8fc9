//! Report model
//!
//! Pure aggregation of per-file comparison results into the structure an
//! external renderer consumes. Nothing here touches the filesystem or formats
//! markup; everything derives `Serialize`.

use serde::Serialize;

use crate::diff::ComparisonResult;
use crate::rtf::{Diagnostic, Extraction, Malformed};

/// Who a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIdentity {
    pub name: String,
    pub bytes: usize,
}

impl FileIdentity {
    pub fn new(name: impl Into<String>, bytes: usize) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// How extraction of one document went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ExtractionStatus {
    Ok {
        code_page: u16,
        diagnostics: Vec<Diagnostic>,
    },
    /// Text was recovered but the document structure is broken.
    Malformed {
        code_page: u16,
        malformed: Malformed,
        diagnostics: Vec<Diagnostic>,
    },
}

impl ExtractionStatus {
    pub fn of(extraction: &Extraction) -> Self {
        match extraction.malformed {
            Some(malformed) => ExtractionStatus::Malformed {
                code_page: extraction.code_page,
                malformed,
                diagnostics: extraction.diagnostics.clone(),
            },
            None => ExtractionStatus::Ok {
                code_page: extraction.code_page,
                diagnostics: extraction.diagnostics.clone(),
            },
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ExtractionStatus::Malformed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub identity: FileIdentity,
    pub extraction: ExtractionStatus,
    pub result: ComparisonResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_compared: usize,
    pub identical_files: usize,
    pub different_files: usize,
    /// Comparison documents whose extraction was malformed.
    pub malformed_files: usize,
    pub total_changes: usize,
}

impl Summary {
    pub fn all_identical(&self) -> bool {
        self.different_files == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub reference: FileIdentity,
    pub reference_extraction: ExtractionStatus,
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

impl Report {
    pub fn all_identical(&self) -> bool {
        self.summary.all_identical()
    }
}

/// Collects file reports in order and computes the summary on `finish`.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    reference: FileIdentity,
    reference_extraction: ExtractionStatus,
    files: Vec<FileReport>,
}

impl ReportBuilder {
    pub fn new(reference: FileIdentity, reference_extraction: ExtractionStatus) -> Self {
        Self {
            reference,
            reference_extraction,
            files: Vec::new(),
        }
    }

    pub fn add(&mut self, file: FileReport) -> &mut Self {
        self.files.push(file);
        self
    }

    pub fn finish(self) -> Report {
        let summary = summarize(&self.files);
        Report {
            reference: self.reference,
            reference_extraction: self.reference_extraction,
            files: self.files,
            summary,
        }
    }
}

pub fn summarize(files: &[FileReport]) -> Summary {
    files.iter().fold(Summary::default(), |mut summary, file| {
        summary.files_compared += 1;
        if file.result.identical {
            summary.identical_files += 1;
        } else {
            summary.different_files += 1;
        }
        if file.extraction.is_malformed() {
            summary.malformed_files += 1;
        }
        summary.total_changes += file.result.counts.total_changes();
        summary
    })
}

/// Assemble a report from already-computed results.
pub fn build_report(
    reference: FileIdentity,
    reference_extraction: ExtractionStatus,
    files: impl IntoIterator<Item = FileReport>,
) -> Report {
    let mut builder = ReportBuilder::new(reference, reference_extraction);
    for file in files {
        builder.add(file);
    }
    builder.finish()
}
