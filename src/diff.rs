//! Sequence alignment and diff segments
//!
//!     The engine aligns the comparison keys of two [`NormalizedSequence`]s and
//!     turns the alignment into an ordered list of [`DiffSegment`]s. Segments
//!     partition both sequences: every reference unit and every comparison unit
//!     belongs to exactly one segment, in order.
//!
//!     Alignment defaults to longest common subsequence. When several longest
//!     alignments exist, the earliest matching positions win, which keeps output
//!     stable across runs. LCS needs a table proportional to the product of the
//!     two lengths left after the shared prefix; past `lcs_cell_limit` the
//!     engine switches to Myers, which works in linear space.
//!
//!     Whatever the algorithm, edits are reported through `similar`'s diff hooks
//!     and collected by a `Replace<Capture>` hook.
//!
//!     Segments carry the original text of each side, never the keys, so a
//!     difference that normalization folded away shows up as an Equal segment
//!     with the wording of whichever side the caller chooses to display.

use std::ops::Range;

use serde::Serialize;
use similar::algorithms::{Capture, DiffHook, Replace};
use similar::DiffTag;

use crate::normalize::NormalizedSequence;
use crate::options::{DiffAlgorithm, DiffOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Equal,
    Inserted,
    Deleted,
    Replaced,
}

/// Which document a segment side belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Reference,
    Comparison,
}

/// One side of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSpan {
    /// Unit indices in the normalized sequence. Empty for the absent side of
    /// an insertion or deletion; its start is the position in that sequence.
    pub units: Range<usize>,
    /// Original text of the units.
    pub text: String,
    /// Byte range in the RTF source, when known.
    pub source: Option<Range<usize>>,
}

impl SideSpan {
    fn new(sequence: &NormalizedSequence, units: Range<usize>) -> Self {
        Self {
            text: sequence.original(units.clone()).to_string(),
            source: sequence.source_span(units.clone()),
            units,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSegment {
    pub kind: SegmentKind,
    pub reference: SideSpan,
    pub comparison: SideSpan,
}

impl DiffSegment {
    pub fn is_change(&self) -> bool {
        self.kind != SegmentKind::Equal
    }

    pub fn side(&self, side: Side) -> &SideSpan {
        match side {
            Side::Reference => &self.reference,
            Side::Comparison => &self.comparison,
        }
    }

    /// Text to display for this segment.
    ///
    /// Equal segments use the requested side. Changes use the side that has
    /// content, preferring the requested one.
    pub fn display_text(&self, side: Side) -> &str {
        match self.kind {
            SegmentKind::Equal | SegmentKind::Replaced => &self.side(side).text,
            SegmentKind::Inserted => &self.comparison.text,
            SegmentKind::Deleted => &self.reference.text,
        }
    }
}

/// Segment and unit tallies for one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffCounts {
    pub equal: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub replacements: usize,
    pub units_inserted: usize,
    pub units_deleted: usize,
    /// Larger side of each replaced segment, summed.
    pub units_replaced: usize,
}

impl DiffCounts {
    pub fn from_segments(segments: &[DiffSegment]) -> Self {
        segments.iter().fold(Self::default(), |mut counts, segment| {
            let old = segment.reference.units.len();
            let new = segment.comparison.units.len();
            match segment.kind {
                SegmentKind::Equal => counts.equal += 1,
                SegmentKind::Inserted => {
                    counts.insertions += 1;
                    counts.units_inserted += new;
                }
                SegmentKind::Deleted => {
                    counts.deletions += 1;
                    counts.units_deleted += old;
                }
                SegmentKind::Replaced => {
                    counts.replacements += 1;
                    counts.units_replaced += old.max(new);
                }
            }
            counts
        })
    }

    /// Number of non-equal segments.
    pub fn total_changes(&self) -> usize {
        self.insertions + self.deletions + self.replacements
    }
}

/// Outcome of comparing one document against the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub identical: bool,
    pub counts: DiffCounts,
    pub segments: Vec<DiffSegment>,
}

impl ComparisonResult {
    pub fn from_segments(segments: Vec<DiffSegment>) -> Self {
        let counts = DiffCounts::from_segments(&segments);
        Self {
            identical: counts.total_changes() == 0,
            counts,
            segments,
        }
    }

    pub fn changes(&self) -> impl Iterator<Item = &DiffSegment> {
        self.segments.iter().filter(|segment| segment.is_change())
    }
}

/// Align two sequences and classify the result into segments.
pub fn diff_sequences(
    reference: &NormalizedSequence,
    comparison: &NormalizedSequence,
    options: &DiffOptions,
) -> Vec<DiffSegment> {
    let old = reference.keys();
    let new = comparison.keys();

    let mut hook = Replace::new(Capture::new());
    match effective_algorithm(options, &old, &new) {
        DiffAlgorithm::Lcs => lcs_diff(&mut hook, &old, &new),
        algorithm => similar::algorithms::diff(
            algorithm.into(),
            &mut hook,
            &old,
            0..old.len(),
            &new,
            0..new.len(),
        ),
    }
    .unwrap_or_else(|never| match never {});

    let blocks = hook
        .into_inner()
        .into_ops()
        .into_iter()
        .map(|op| {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            (tag == DiffTag::Equal, old_range, new_range)
        })
        .filter(|(_, old_range, new_range)| !old_range.is_empty() || !new_range.is_empty());

    coalesce(blocks)
        .into_iter()
        .map(|(kind, old_range, new_range)| DiffSegment {
            kind,
            reference: SideSpan::new(reference, old_range),
            comparison: SideSpan::new(comparison, new_range),
        })
        .collect()
}

/// Merge adjacent blocks of the same equality so each gap between matching
/// runs becomes exactly one change segment.
fn coalesce<I>(blocks: I) -> Vec<(SegmentKind, Range<usize>, Range<usize>)>
where
    I: IntoIterator<Item = (bool, Range<usize>, Range<usize>)>,
{
    let mut merged: Vec<(bool, Range<usize>, Range<usize>)> = Vec::new();
    for (equal, old_range, new_range) in blocks {
        match merged.last_mut() {
            Some((last_equal, last_old, last_new)) if *last_equal == equal => {
                last_old.end = old_range.end;
                last_new.end = new_range.end;
            }
            _ => merged.push((equal, old_range, new_range)),
        }
    }
    merged
        .into_iter()
        .map(|(equal, old_range, new_range)| {
            let kind = match (equal, old_range.is_empty(), new_range.is_empty()) {
                (true, _, _) => SegmentKind::Equal,
                (false, true, _) => SegmentKind::Inserted,
                (false, _, true) => SegmentKind::Deleted,
                (false, false, false) => SegmentKind::Replaced,
            };
            (kind, old_range, new_range)
        })
        .collect()
}

/// Longest common subsequence alignment.
///
/// `table` holds the LCS length of every pair of suffixes. The forward walk
/// takes a match as soon as one is available. Otherwise it steps past the
/// reference unit when that keeps the LCS length, and past the comparison unit
/// only when it must, so matches land at the earliest possible positions in
/// both sequences. The common suffix is not trimmed: doing so would pin a
/// repeated unit to its last occurrence.
fn lcs_diff<D: DiffHook>(hook: &mut D, old: &[&str], new: &[&str]) -> Result<(), D::Error> {
    let prefix = common_prefix(old, new);
    if prefix > 0 {
        hook.equal(0, 0, prefix)?;
    }
    let (old_rest, new_rest) = (&old[prefix..], &new[prefix..]);
    let table = suffix_lcs_table(old_rest, new_rest);
    let width = new_rest.len() + 1;

    let (mut i, mut j) = (0, 0);
    while i < old_rest.len() && j < new_rest.len() {
        if old_rest[i] == new_rest[j] {
            hook.equal(prefix + i, prefix + j, 1)?;
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            hook.delete(prefix + i, 1, prefix + j)?;
            i += 1;
        } else {
            hook.insert(prefix + i, prefix + j, 1)?;
            j += 1;
        }
    }
    if i < old_rest.len() {
        hook.delete(prefix + i, old_rest.len() - i, prefix + j)?;
    }
    if j < new_rest.len() {
        hook.insert(prefix + i, prefix + j, new_rest.len() - j)?;
    }
    hook.finish()
}

/// Row-major `(old.len() + 1) x (new.len() + 1)` table where cell `(i, j)` is
/// the LCS length of `old[i..]` and `new[j..]`.
fn suffix_lcs_table(old: &[&str], new: &[&str]) -> Vec<u32> {
    let width = new.len() + 1;
    let mut table = vec![0u32; (old.len() + 1) * width];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }
    table
}

fn common_prefix(old: &[&str], new: &[&str]) -> usize {
    old.iter().zip(new).take_while(|(a, b)| a == b).count()
}

fn effective_algorithm(options: &DiffOptions, old: &[&str], new: &[&str]) -> DiffAlgorithm {
    if options.algorithm != DiffAlgorithm::Lcs {
        return options.algorithm;
    }
    let prefix = common_prefix(old, new);
    let cells = (old.len() - prefix).saturating_mul(new.len() - prefix);
    if cells > options.lcs_cell_limit {
        tracing::warn!(
            cells,
            limit = options.lcs_cell_limit,
            "LCS table too large, aligning with Myers instead"
        );
        return DiffAlgorithm::Myers;
    }
    DiffAlgorithm::Lcs
}
