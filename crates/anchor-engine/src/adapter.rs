//! Seams between the engine and a concrete document structure
//!
//! A `LeafSource` snapshots the structure into ordered leaves; a
//! `FragmentSink` writes the marked fragments back. The engine itself never
//! touches the caller's structure.

use crate::error::AnchorError;
use shared_types::{LeafFragments, LeafSegment};

/// Produces the ordered leaf snapshot for one anchoring pass. Implementations
/// exclude non-content regions and any markers from earlier passes.
pub trait LeafSource {
    fn leaves(&self) -> Vec<LeafSegment>;
}

/// Receives the fragments produced by one anchoring pass.
pub trait FragmentSink {
    type Error: From<AnchorError>;

    fn apply(&mut self, fragments: &[LeafFragments]) -> Result<(), Self::Error>;
}

/// A source over an owned leaf list.
#[derive(Debug, Clone, Default)]
pub struct VecSource(pub Vec<LeafSegment>);

impl VecSource {
    /// Leaves with ids "0", "1", ... in the given order
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| LeafSegment::new(i.to_string(), text, i))
                .collect(),
        )
    }
}

impl LeafSource for VecSource {
    fn leaves(&self) -> Vec<LeafSegment> {
        self.0.clone()
    }
}

/// Collects the fragments of the latest pass.
impl FragmentSink for Vec<LeafFragments> {
    type Error = AnchorError;

    fn apply(&mut self, fragments: &[LeafFragments]) -> Result<(), Self::Error> {
        self.clear();
        self.extend_from_slice(fragments);
        Ok(())
    }
}
