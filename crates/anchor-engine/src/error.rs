use shared_types::LeafId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    #[error("Leaf at index {index} has position {found}, expected {expected}")]
    OutOfOrder {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate leaf id: {0}")]
    DuplicateLeafId(LeafId),

    #[error("Invalid span {start}..{end} for leaf {leaf_id} of length {len}")]
    InvalidSpan {
        leaf_id: LeafId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Overlapping spans in leaf {leaf_id} at offset {offset}")]
    OverlappingSpans { leaf_id: LeafId, offset: usize },

    #[error("Offset {offset} in leaf {leaf_id} is not on a character boundary")]
    NotCharBoundary { leaf_id: LeafId, offset: usize },

    #[error("Span references unknown leaf: {0}")]
    UnknownLeaf(LeafId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnchorError>;
