//! Locates a quotation in the canonical document text
//!
//! The whole normalized quotation is searched first. If it is missing, a
//! bounded prefix is tried instead, and the match then covers only that
//! prefix. Only the first occurrence is ever reported.

use crate::config::AnchorConfig;
use crate::document::DocumentText;
use crate::mapper::to_raw_range;
use crate::normalize::normalize_quotation;
use serde::Serialize;
use shared_types::MatchKind;
use std::ops::Range;

/// A located quotation, in raw document offsets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub raw_start: usize,
    pub raw_end: usize,
    pub kind: MatchKind,
    /// 1.0 for exact matches; the verified share of the quotation otherwise
    pub confidence: f32,
}

impl MatchResult {
    pub fn raw_range(&self) -> Range<usize> {
        self.raw_start..self.raw_end
    }

    pub fn is_exact(&self) -> bool {
        self.kind == MatchKind::Exact
    }
}

/// Outcome of locating one quotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Located {
    /// Rejected before searching
    TooShort { chars: usize },
    Missing { fallback_tried: bool },
    Found(MatchResult),
}

impl Located {
    /// Number of searches run against the document
    pub fn searches(&self) -> usize {
        match self {
            Located::TooShort { .. } => 0,
            Located::Missing { fallback_tried } => 1 + usize::from(*fallback_tried),
            Located::Found(found) => match found.kind {
                MatchKind::Exact => 1,
                MatchKind::PrefixFallback => 2,
            },
        }
    }

    pub fn into_match(self) -> Option<MatchResult> {
        match self {
            Located::Found(found) => Some(found),
            _ => None,
        }
    }
}

/// Searches one document. Holds only shared borrows, so a single matcher
/// can serve many quotations, including from several threads.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    document: &'a DocumentText,
    config: &'a AnchorConfig,
}

impl<'a> Matcher<'a> {
    pub fn new(document: &'a DocumentText, config: &'a AnchorConfig) -> Self {
        Self { document, config }
    }

    pub fn locate(&self, quotation: &str) -> Located {
        let needle = normalize_quotation(quotation);
        let chars = needle.chars().count();
        if chars < self.config.min_quote_chars {
            return Located::TooShort { chars };
        }

        if let Some(found) = self.search(&needle, MatchKind::Exact, 1.0) {
            return Located::Found(found);
        }

        // A prefix as long as the quotation would repeat the exact search
        let prefix_chars = self.config.fallback_prefix_chars;
        if !self.config.fallback_enabled || chars <= prefix_chars {
            return Located::Missing {
                fallback_tried: false,
            };
        }

        let prefix_end = needle
            .char_indices()
            .nth(prefix_chars)
            .map(|(i, _)| i)
            .unwrap_or(needle.len());
        let confidence = prefix_chars as f32 / chars as f32;

        match self.search(&needle[..prefix_end], MatchKind::PrefixFallback, confidence) {
            Some(found) => Located::Found(found),
            None => Located::Missing {
                fallback_tried: true,
            },
        }
    }

    fn search(&self, needle: &str, kind: MatchKind, confidence: f32) -> Option<MatchResult> {
        let haystack = self.document.normalized();
        let start = haystack.as_str().find(needle)?;
        let raw = to_raw_range(haystack, start..start + needle.len());
        Some(MatchResult {
            raw_start: raw.start,
            raw_end: raw.end,
            kind,
            confidence,
        })
    }
}
