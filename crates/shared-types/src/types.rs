use std::fmt;

/// Opaque, stable identifier of one text-bearing leaf, assigned by the
/// text tree provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LeafId(pub String);

impl LeafId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeafId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One leaf of the rendered document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LeafSegment {
    pub id: LeafId,
    pub text: String,
    pub position: usize, // Index in document order, starting at 0
}

impl LeafSegment {
    pub fn new(id: impl Into<String>, text: impl Into<String>, position: usize) -> Self {
        Self {
            id: LeafId::new(id),
            text: text.into(),
            position,
        }
    }
}

/// A quotation produced by the analysis process, to be anchored onto the document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quotation {
    pub text: String,
    pub category: String, // Caller-defined, e.g. "high-risk"
    #[serde(default)]
    pub explanation: String,
}

impl Quotation {
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            explanation: explanation.into(),
        }
    }
}

/// How a quotation was located in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Exact,
    PrefixFallback,
}

/// A leaf-local range to be marked, carrying the owning quotation's labels.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HighlightSpan {
    pub leaf_id: LeafId,
    pub local_start: usize, // Byte offset into the leaf text
    pub local_end: usize,   // Exclusive
    pub category: String,
    pub explanation: String,
    pub kind: MatchKind,
    pub quotation: usize, // Index of the quotation in caller priority order
}

impl HighlightSpan {
    pub fn len(&self) -> usize {
        self.local_end - self.local_start
    }

    pub fn is_empty(&self) -> bool {
        self.local_start >= self.local_end
    }
}

/// A piece of a leaf after marking. Concatenating a leaf's fragments in
/// order yields the leaf's original text.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    Plain {
        text: String,
    },
    Marked {
        text: String,
        leaf_id: LeafId,
        local_start: usize,
        local_end: usize,
        category: String,
        explanation: String,
        kind: MatchKind,
        quotation: usize,
    },
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Plain { text } | Fragment::Marked { text, .. } => text,
        }
    }

    pub fn is_marked(&self) -> bool {
        matches!(self, Fragment::Marked { .. })
    }
}

/// The fragment sequence replacing one leaf.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LeafFragments {
    pub leaf_id: LeafId,
    pub fragments: Vec<Fragment>,
}

impl LeafFragments {
    /// A leaf with no marks: a single plain fragment (none for an empty leaf).
    pub fn unchanged(leaf: &LeafSegment) -> Self {
        let fragments = if leaf.text.is_empty() {
            Vec::new()
        } else {
            vec![Fragment::Plain {
                text: leaf.text.clone(),
            }]
        };
        Self {
            leaf_id: leaf.id.clone(),
            fragments,
        }
    }

    /// Rebuild the leaf's text from its fragments.
    pub fn text(&self) -> String {
        self.fragments.iter().map(Fragment::text).collect()
    }

    pub fn has_marks(&self) -> bool {
        self.fragments.iter().any(Fragment::is_marked)
    }
}
