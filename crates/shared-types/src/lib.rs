pub mod types;

pub use types::{
    Fragment, HighlightSpan, LeafFragments, LeafId, LeafSegment, MatchKind, Quotation,
};
