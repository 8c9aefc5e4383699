//! Anchor Engine - places analysis quotations onto rendered document text
//!
//! This crate provides:
//! - Document snapshot and leaf validation
//! - Whitespace/case normalization with raw offset recovery
//! - Exact and prefix-fallback quotation matching
//! - Raw range distribution across leaves
//! - Overlap resolution between competing quotations
//! - Leaf splitting into plain and marked fragments

pub mod adapter;
pub mod config;
pub mod document;
pub mod error;
pub mod mapper;
pub mod matcher;
pub mod mutator;
pub mod normalize;
pub mod overlap;

use serde::Serialize;
use shared_types::{LeafFragments, LeafSegment, Quotation};

pub use adapter::{FragmentSink, LeafSource, VecSource};
pub use config::{AnchorConfig, OverlapPolicy};
pub use document::DocumentText;
pub use error::{AnchorError, Result};
pub use matcher::{Located, MatchResult, Matcher};
pub use normalize::NormalizedText;

/// What happened to one quotation during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuotationOutcome {
    /// Too short to search for
    Rejected { chars: usize },
    NotFound,
    /// Found, but the text was already claimed by an earlier quotation
    Suppressed { matched: MatchResult },
    Anchored {
        matched: MatchResult,
        spans: usize,
        clipped: bool,
    },
}

impl QuotationOutcome {
    pub fn is_anchored(&self) -> bool {
        matches!(self, QuotationOutcome::Anchored { .. })
    }
}

/// Per-pass counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnchorReport {
    pub total: usize,
    pub anchored: usize,
    pub fallback: usize,
    pub clipped: usize,
    pub not_found: usize,
    pub rejected: usize,
    pub suppressed: usize,
    /// Searches actually run against the document
    pub searches: usize,
}

impl AnchorReport {
    pub fn skipped(&self) -> usize {
        self.total - self.anchored
    }
}

/// Output of one anchoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorRun {
    pub fragments: Vec<LeafFragments>,
    /// One entry per quotation, in the order supplied
    pub outcomes: Vec<QuotationOutcome>,
    pub report: AnchorReport,
}

/// Anchor engine entry point
#[derive(Debug, Clone, Default)]
pub struct Anchorer {
    config: AnchorConfig,
}

impl Anchorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnchorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Anchor quotations onto a leaf snapshot. Quotation order is priority
    /// order: earlier quotations win overlapping text.
    pub fn anchor(&self, leaves: Vec<LeafSegment>, quotations: &[Quotation]) -> Result<AnchorRun> {
        let document = DocumentText::new(leaves)?;
        self.anchor_document(&document, quotations)
    }

    /// Locate every quotation independently. Nothing here depends on other
    /// quotations, so callers may fan this out across threads.
    pub fn locate_all(&self, document: &DocumentText, quotations: &[Quotation]) -> Vec<Located> {
        let matcher = Matcher::new(document, &self.config);
        quotations.iter().map(|q| matcher.locate(&q.text)).collect()
    }

    pub fn anchor_document(
        &self,
        document: &DocumentText,
        quotations: &[Quotation],
    ) -> Result<AnchorRun> {
        let located = self.locate_all(document, quotations);
        let mut ledger = overlap::ClaimLedger::new(self.config.overlap_policy);
        let mut report = AnchorReport {
            total: quotations.len(),
            ..AnchorReport::default()
        };
        let mut outcomes = Vec::with_capacity(quotations.len());
        let mut spans = Vec::new();

        for (index, (quotation, located)) in quotations.iter().zip(located).enumerate() {
            report.searches += located.searches();

            let outcome = match located {
                Located::TooShort { chars } => {
                    tracing::debug!(
                        "Quotation {} rejected: {} chars, minimum is {}",
                        index,
                        chars,
                        self.config.min_quote_chars
                    );
                    report.rejected += 1;
                    QuotationOutcome::Rejected { chars }
                }
                Located::Missing { fallback_tried } => {
                    tracing::debug!(
                        "Quotation {} not found (fallback tried: {})",
                        index,
                        fallback_tried
                    );
                    report.not_found += 1;
                    QuotationOutcome::NotFound
                }
                Located::Found(matched) => {
                    let claim = ledger.claim(matched.raw_range());
                    if claim.is_suppressed() {
                        tracing::warn!(
                            "Quotation {} suppressed: {}..{} already claimed",
                            index,
                            matched.raw_start,
                            matched.raw_end
                        );
                        report.suppressed += 1;
                        QuotationOutcome::Suppressed { matched }
                    } else {
                        let before = spans.len();
                        for piece in claim.granted {
                            spans.extend(mapper::distribute(
                                document,
                                piece,
                                quotation,
                                index,
                                matched.kind,
                            ));
                        }
                        if claim.clipped {
                            tracing::warn!(
                                "Quotation {} clipped to text not claimed by earlier quotations",
                                index
                            );
                            report.clipped += 1;
                        }
                        if !matched.is_exact() {
                            report.fallback += 1;
                        }
                        report.anchored += 1;
                        tracing::debug!(
                            "Quotation {} anchored at {}..{} ({:?}, {} spans)",
                            index,
                            matched.raw_start,
                            matched.raw_end,
                            matched.kind,
                            spans.len() - before
                        );
                        QuotationOutcome::Anchored {
                            spans: spans.len() - before,
                            clipped: claim.clipped,
                            matched,
                        }
                    }
                }
            };
            outcomes.push(outcome);
        }

        let fragments = mutator::apply_spans(document, &spans)?;

        tracing::info!(
            "Anchored {} of {} quotations ({} skipped)",
            report.anchored,
            report.total,
            report.skipped()
        );

        Ok(AnchorRun {
            fragments,
            outcomes,
            report,
        })
    }

    /// Snapshot `source`, anchor, and hand the fragments to `sink`.
    pub fn run<S, K>(
        &self,
        source: &S,
        quotations: &[Quotation],
        sink: &mut K,
    ) -> std::result::Result<AnchorRun, K::Error>
    where
        S: LeafSource + ?Sized,
        K: FragmentSink,
    {
        let run = self.anchor(source.leaves(), quotations)?;
        sink.apply(&run.fragments)?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaves(texts: &[&str]) -> Vec<LeafSegment> {
        VecSource::from_texts(texts.iter().copied()).0
    }

    #[test]
    fn test_later_quotation_is_clipped() {
        let anchorer = Anchorer::new();
        let quotations = vec![
            Quotation::new("shall own the Work", "high", "Ownership transfer"),
            Quotation::new("own the Work forever", "medium", "Perpetual term"),
        ];
        let run = anchorer
            .anchor(leaves(&["The Publisher shall own the Work forever."]), &quotations)
            .unwrap();

        assert!(matches!(
            run.outcomes[1],
            QuotationOutcome::Anchored { clipped: true, spans: 1, .. }
        ));
        let marked: Vec<_> = run.fragments[0]
            .fragments
            .iter()
            .filter(|f| f.is_marked())
            .map(|f| f.text())
            .collect();
        assert_eq!(marked, vec!["shall own the Work", " forever"]);
        assert_eq!(run.report.clipped, 1);
    }

    #[test]
    fn test_contained_quotation_is_suppressed() {
        let anchorer = Anchorer::new();
        let quotations = vec![
            Quotation::new("The Publisher shall own the Work forever", "high", ""),
            Quotation::new("shall own the Work", "low", ""),
        ];
        let run = anchorer
            .anchor(leaves(&["The Publisher shall own the Work forever."]), &quotations)
            .unwrap();

        assert!(matches!(run.outcomes[1], QuotationOutcome::Suppressed { .. }));
        assert_eq!(run.report.suppressed, 1);
        assert_eq!(run.report.anchored, 1);
        assert_eq!(run.fragments[0].fragments.len(), 2);
    }

    #[test]
    fn test_drop_policy_suppresses_partial_overlap() {
        let config = AnchorConfig::default().with_overlap_policy(OverlapPolicy::Drop);
        let anchorer = Anchorer::with_config(config).unwrap();
        let quotations = vec![
            Quotation::new("shall own the Work", "high", ""),
            Quotation::new("own the Work forever", "medium", ""),
        ];
        let run = anchorer
            .anchor(leaves(&["The Publisher shall own the Work forever."]), &quotations)
            .unwrap();
        assert!(matches!(run.outcomes[1], QuotationOutcome::Suppressed { .. }));
    }

    #[test]
    fn test_report_counts() {
        let anchorer = Anchorer::new();
        let quotations = vec![
            Quotation::new("shall own the Work", "high", ""),
            Quotation::new("short", "high", ""),
            Quotation::new("completely unrelated text not present anywhere", "low", ""),
        ];
        let run = anchorer
            .anchor(leaves(&["The Publisher shall own the Work forever."]), &quotations)
            .unwrap();
        assert_eq!(
            run.report,
            AnchorReport {
                total: 3,
                anchored: 1,
                fallback: 0,
                clipped: 0,
                not_found: 1,
                rejected: 1,
                suppressed: 0,
                searches: 2,
            }
        );
        assert_eq!(run.report.skipped(), 2);
    }

    #[test]
    fn test_invalid_leaves_abort_the_pass() {
        let mut input = leaves(&["a", "b"]);
        input[1].position = 5;
        let err = Anchorer::new()
            .anchor(input, &[Quotation::new("anything at all", "x", "")])
            .unwrap_err();
        assert!(matches!(err, AnchorError::OutOfOrder { .. }));
    }

    #[test]
    fn test_run_writes_to_sink() {
        let source = VecSource::from_texts(["The Publisher ", "shall own the Work ", "forever."]);
        let mut sink: Vec<LeafFragments> = Vec::new();
        let run = Anchorer::new()
            .run(
                &source,
                &[Quotation::new("shall own the Work", "high", "")],
                &mut sink,
            )
            .unwrap();
        assert_eq!(sink, run.fragments);
        assert!(sink[1].has_marks());
    }

    #[test]
    fn test_with_config_validates() {
        let config = AnchorConfig::default().with_fallback_prefix_chars(0);
        assert!(Anchorer::with_config(config).is_err());
    }
}
