//! Ordered snapshot of a document's text-bearing leaves
//!
//! `DocumentText` validates the leaf list once, concatenates the leaves into
//! the logical raw text, and keeps a cumulative offset table so any raw
//! offset can be traced back to its leaf.

use crate::error::{AnchorError, Result};
use crate::normalize::NormalizedText;
use shared_types::LeafSegment;
use std::collections::HashSet;
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct DocumentText {
    leaves: Vec<LeafSegment>,
    offsets: Vec<usize>, // offsets[i]..offsets[i + 1] is leaf i
    raw: String,
    normalized: NormalizedText,
}

impl DocumentText {
    /// Build the snapshot, rejecting leaf lists whose positions are not
    /// contiguous and ascending or whose ids repeat.
    pub fn new(leaves: Vec<LeafSegment>) -> Result<Self> {
        validate_leaves(&leaves)?;

        let mut offsets = Vec::with_capacity(leaves.len() + 1);
        let mut raw = String::with_capacity(leaves.iter().map(|l| l.text.len()).sum());
        offsets.push(0);
        for leaf in &leaves {
            raw.push_str(&leaf.text);
            offsets.push(raw.len());
        }
        let normalized = NormalizedText::new(&raw);

        Ok(Self {
            leaves,
            offsets,
            raw,
            normalized,
        })
    }

    pub fn leaves(&self) -> &[LeafSegment] {
        &self.leaves
    }

    pub fn leaf(&self, index: usize) -> Option<&LeafSegment> {
        self.leaves.get(index)
    }

    /// Raw bounds of leaf `index` within the concatenated text
    pub fn leaf_bounds(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    /// Index of the first leaf whose raw end lies past `offset`, or the
    /// leaf count when no such leaf exists.
    pub fn first_leaf_ending_after(&self, offset: usize) -> usize {
        self.offsets[1..].partition_point(|&end| end <= offset)
    }
}

fn validate_leaves(leaves: &[LeafSegment]) -> Result<()> {
    let mut seen = HashSet::with_capacity(leaves.len());
    let base = leaves.first().map(|leaf| leaf.position).unwrap_or(0);

    for (index, leaf) in leaves.iter().enumerate() {
        let expected = base + index;
        if leaf.position != expected {
            return Err(AnchorError::OutOfOrder {
                index,
                expected,
                found: leaf.position,
            });
        }
        if !seen.insert(&leaf.id) {
            return Err(AnchorError::DuplicateLeafId(leaf.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaves(texts: &[&str]) -> Vec<LeafSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| LeafSegment::new(format!("leaf-{}", i), *text, i))
            .collect()
    }

    #[test]
    fn test_concatenation_reproduces_leaves() {
        let document =
            DocumentText::new(leaves(&["The Publisher ", "shall own the Work ", "forever."]))
                .unwrap();
        assert_eq!(document.raw_text(), "The Publisher shall own the Work forever.");
        assert_eq!(document.leaf_bounds(1), 14..33);
        let total: usize = document.leaves().iter().map(|l| l.text.len()).sum();
        assert_eq!(total, document.raw_len());
    }

    #[test]
    fn test_first_leaf_ending_after() {
        let document = DocumentText::new(leaves(&["abc", "", "de", "fgh"])).unwrap();
        assert_eq!(document.first_leaf_ending_after(0), 0);
        assert_eq!(document.first_leaf_ending_after(2), 0);
        // Empty leaf 1 ends at 3, so offset 3 starts in leaf 2
        assert_eq!(document.first_leaf_ending_after(3), 2);
        assert_eq!(document.first_leaf_ending_after(5), 3);
        assert_eq!(document.first_leaf_ending_after(8), 4);
    }

    #[test]
    fn test_positions_may_start_above_zero() {
        let mut input = leaves(&["a", "b"]);
        input[0].position = 7;
        input[1].position = 8;
        assert!(DocumentText::new(input).is_ok());
    }

    #[test]
    fn test_rejects_gap_in_positions() {
        let mut input = leaves(&["a", "b", "c"]);
        input[2].position = 3;
        let err = DocumentText::new(input).unwrap_err();
        assert_eq!(
            err,
            AnchorError::OutOfOrder {
                index: 2,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_rejects_reordered_leaves() {
        let mut input = leaves(&["a", "b"]);
        input.swap(0, 1);
        assert!(matches!(
            DocumentText::new(input),
            Err(AnchorError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut input = leaves(&["a", "b"]);
        input[1].id = input[0].id.clone();
        assert!(matches!(
            DocumentText::new(input),
            Err(AnchorError::DuplicateLeafId(_))
        ));
    }

    #[test]
    fn test_empty_document() {
        let document = DocumentText::new(Vec::new()).unwrap();
        assert_eq!(document.raw_len(), 0);
        assert!(document.normalized().is_empty());
        assert_eq!(document.first_leaf_ending_after(0), 0);
    }
}
