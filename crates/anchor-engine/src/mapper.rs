//! Projects canonical matches onto raw offsets and distributes raw ranges
//! across the leaves they overlap.

use crate::document::DocumentText;
use crate::normalize::NormalizedText;
use shared_types::{HighlightSpan, MatchKind, Quotation};
use std::ops::Range;

/// Translate a canonical byte range into the raw range it was produced from.
pub fn to_raw_range(normalized: &NormalizedText, canonical: Range<usize>) -> Range<usize> {
    let start = normalized.raw_offset(canonical.start);
    let end = normalized.raw_offset(canonical.end);
    start..end.max(start)
}

/// Leaf-local pieces of a raw range, as `(leaf index, local range)` pairs in
/// document order. An empty raw range yields nothing.
pub fn overlapping_leaves(
    document: &DocumentText,
    raw: Range<usize>,
) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
    let Range {
        start: raw_start,
        end: raw_end,
    } = raw;
    let first = if raw_start < raw_end {
        document.first_leaf_ending_after(raw_start)
    } else {
        document.leaves().len()
    };

    (first..document.leaves().len())
        .map(move |index| (index, document.leaf_bounds(index)))
        .take_while(move |(_, bounds)| bounds.start < raw_end)
        .filter_map(move |(index, bounds)| {
            let start = bounds.start.max(raw_start);
            let end = bounds.end.min(raw_end);
            (start < end).then(|| (index, start - bounds.start..end - bounds.start))
        })
}

/// Produce the highlight spans one quotation contributes for a raw range.
pub fn distribute(
    document: &DocumentText,
    raw: Range<usize>,
    quotation: &Quotation,
    quotation_index: usize,
    kind: MatchKind,
) -> Vec<HighlightSpan> {
    overlapping_leaves(document, raw)
        .map(|(index, local)| HighlightSpan {
            leaf_id: document.leaves()[index].id.clone(),
            local_start: local.start,
            local_end: local.end,
            category: quotation.category.clone(),
            explanation: quotation.explanation.clone(),
            kind,
            quotation: quotation_index,
        })
        .collect()
}
