//! Splits leaves into plain and marked fragments
//!
//! Marking is a pure overlay: the fragments of a leaf, concatenated in
//! order, always reproduce the leaf's original text. Leaves are handled
//! independently, so callers may partition the work by leaf.

use crate::document::DocumentText;
use crate::error::{AnchorError, Result};
use shared_types::{Fragment, HighlightSpan, LeafFragments, LeafId, LeafSegment};
use std::collections::HashMap;

/// Apply spans to every leaf of the document, returning fragments in
/// document order. Leaves without spans come back as a single plain fragment.
pub fn apply_spans(document: &DocumentText, spans: &[HighlightSpan]) -> Result<Vec<LeafFragments>> {
    let index_of: HashMap<&LeafId, usize> = document
        .leaves()
        .iter()
        .enumerate()
        .map(|(index, leaf)| (&leaf.id, index))
        .collect();

    let mut grouped: Vec<Vec<&HighlightSpan>> = vec![Vec::new(); document.leaves().len()];
    for span in spans {
        let index = index_of
            .get(&span.leaf_id)
            .ok_or_else(|| AnchorError::UnknownLeaf(span.leaf_id.clone()))?;
        grouped[*index].push(span);
    }

    document
        .leaves()
        .iter()
        .zip(grouped.iter_mut())
        .map(|(leaf, leaf_spans)| split_leaf(leaf, leaf_spans))
        .collect()
}

/// Split one leaf around its spans. The spans must belong to this leaf and
/// must not overlap one another.
pub fn split_leaf(leaf: &LeafSegment, spans: &mut [&HighlightSpan]) -> Result<LeafFragments> {
    if spans.is_empty() {
        return Ok(LeafFragments::unchanged(leaf));
    }

    spans.sort_by_key(|span| (span.local_start, span.local_end));
    validate_spans(leaf, spans)?;

    // Later spans are cut first so earlier offsets stay valid
    let mut remaining = leaf.text.as_str();
    let mut reversed = Vec::with_capacity(spans.len() * 2 + 1);
    for span in spans.iter().rev() {
        let (before, rest) = remaining.split_at(span.local_start);
        let (marked, after) = rest.split_at(span.local_end - span.local_start);
        if !after.is_empty() {
            reversed.push(Fragment::Plain {
                text: after.to_string(),
            });
        }
        reversed.push(Fragment::Marked {
            text: marked.to_string(),
            leaf_id: leaf.id.clone(),
            local_start: span.local_start,
            local_end: span.local_end,
            category: span.category.clone(),
            explanation: span.explanation.clone(),
            kind: span.kind,
            quotation: span.quotation,
        });
        remaining = before;
    }
    if !remaining.is_empty() {
        reversed.push(Fragment::Plain {
            text: remaining.to_string(),
        });
    }
    reversed.reverse();

    Ok(LeafFragments {
        leaf_id: leaf.id.clone(),
        fragments: reversed,
    })
}

/// Spans must be sorted by start.
fn validate_spans(leaf: &LeafSegment, spans: &[&HighlightSpan]) -> Result<()> {
    let text = leaf.text.as_str();
    let mut previous_end = 0;

    for span in spans {
        if span.leaf_id != leaf.id {
            return Err(AnchorError::UnknownLeaf(span.leaf_id.clone()));
        }
        if span.local_start >= span.local_end || span.local_end > text.len() {
            return Err(AnchorError::InvalidSpan {
                leaf_id: leaf.id.clone(),
                start: span.local_start,
                end: span.local_end,
                len: text.len(),
            });
        }
        for offset in [span.local_start, span.local_end] {
            if !text.is_char_boundary(offset) {
                return Err(AnchorError::NotCharBoundary {
                    leaf_id: leaf.id.clone(),
                    offset,
                });
            }
        }
        if span.local_start < previous_end {
            return Err(AnchorError::OverlappingSpans {
                leaf_id: leaf.id.clone(),
                offset: span.local_start,
            });
        }
        previous_end = span.local_end;
    }
    Ok(())
}
