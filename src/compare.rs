//! Text-to-result comparison
//!
//! [`Comparer`] applies the same boilerplate filter and normalization to both
//! texts and runs the diff engine on the results. A reference that is compared
//! against many documents can be prepared once with [`Comparer::prepare`].

use std::sync::Arc;

use crate::boilerplate::BoilerplateFilter;
use crate::diff::{diff_sequences, ComparisonResult};
use crate::normalize::{normalize, NormalizedSequence};
use crate::options::CompareOptions;
use crate::text::ExtractedText;

#[derive(Debug, Clone, Default)]
pub struct Comparer {
    filter: BoilerplateFilter,
    options: CompareOptions,
}

impl Comparer {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            filter: BoilerplateFilter::new(),
            options,
        }
    }

    /// Use `filter` instead of the built-in boilerplate rules.
    pub fn with_filter(mut self, filter: BoilerplateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    pub fn filter(&self) -> &BoilerplateFilter {
        &self.filter
    }

    /// Filter and normalize one text.
    pub fn prepare(&self, text: &ExtractedText) -> NormalizedSequence {
        let filtered = self.filter.filter(text, self.options.filter_boilerplate);
        normalize(Arc::new(filtered), &self.options.normalize)
    }

    pub fn compare_prepared(
        &self,
        reference: &NormalizedSequence,
        comparison: &NormalizedSequence,
    ) -> ComparisonResult {
        let segments = diff_sequences(reference, comparison, &self.options.diff);
        let result = ComparisonResult::from_segments(segments);
        tracing::debug!(
            reference_units = reference.len(),
            comparison_units = comparison.len(),
            changes = result.counts.total_changes(),
            "compared texts"
        );
        result
    }

    pub fn compare(&self, reference: &ExtractedText, comparison: &ExtractedText) -> ComparisonResult {
        self.compare_prepared(&self.prepare(reference), &self.prepare(comparison))
    }
}

/// Compare two extracted texts with the built-in boilerplate rules.
pub fn compare(
    reference: &ExtractedText,
    comparison: &ExtractedText,
    options: &CompareOptions,
) -> ComparisonResult {
    Comparer::new(*options).compare(reference, comparison)
}
