//! Job input and output formats

use crate::tree::{fragment_nodes, render_markup, Node, TreeSink, TreeSource};
use anchor_engine::{AnchorReport, Anchorer, QuotationOutcome, VecSource};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use shared_types::{LeafFragments, LeafSegment, Quotation};
use std::fs;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Markup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeafInput {
    pub id: String,
    pub text: String,
}

/// A document plus quotations. Exactly one of `leaves` or `tree` is given.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub leaves: Option<Vec<LeafInput>>,
    #[serde(default)]
    pub tree: Option<Node>,
    pub quotations: Vec<Quotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotationStatus {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub outcome: QuotationOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragments: Option<Vec<LeafFragments>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<Node>,
    /// Every quotation, anchored or not
    pub quotations: Vec<QuotationStatus>,
    pub report: AnchorReport,
}

impl Job {
    /// Read a job from a file, or from stdin when `path` is "-"
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read job from stdin")?;
            buf
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read job file: {}", path.display()))?
        };
        Self::from_json(&content)
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("Failed to parse job JSON")
    }

    pub fn execute(self, anchorer: &Anchorer) -> anyhow::Result<JobOutput> {
        match (self.leaves, self.tree) {
            (Some(leaves), None) => {
                let source = VecSource(
                    leaves
                        .into_iter()
                        .enumerate()
                        .map(|(i, leaf)| LeafSegment::new(leaf.id, leaf.text, i))
                        .collect(),
                );
                let mut fragments: Vec<LeafFragments> = Vec::new();
                let run = anchorer.run(&source, &self.quotations, &mut fragments)?;
                Ok(JobOutput {
                    fragments: Some(fragments),
                    tree: None,
                    quotations: statuses(self.quotations, run.outcomes),
                    report: run.report,
                })
            }
            (None, Some(mut tree)) => {
                let source = TreeSource::snapshot(&tree);
                let run = anchorer.run(&source, &self.quotations, &mut TreeSink::new(&mut tree))?;
                Ok(JobOutput {
                    fragments: None,
                    tree: Some(tree),
                    quotations: statuses(self.quotations, run.outcomes),
                    report: run.report,
                })
            }
            (Some(_), Some(_)) => bail!("Job must give either `leaves` or `tree`, not both"),
            (None, None) => bail!("Job must give either `leaves` or `tree`"),
        }
    }
}

fn statuses(quotations: Vec<Quotation>, outcomes: Vec<QuotationOutcome>) -> Vec<QuotationStatus> {
    quotations
        .into_iter()
        .zip(outcomes)
        .map(|(quotation, outcome)| QuotationStatus { quotation, outcome })
        .collect()
}

impl JobOutput {
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize output")
            }
            OutputFormat::Markup => Ok(self.markup()),
        }
    }

    fn markup(&self) -> String {
        if let Some(tree) = &self.tree {
            return render_markup(tree);
        }
        self.fragments
            .iter()
            .flatten()
            .flat_map(fragment_nodes)
            .map(|node| render_markup(&node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LEAVES_JOB: &str = r#"{
        "leaves": [
            {"id": "a", "text": "The Publisher "},
            {"id": "b", "text": "shall own the Work "},
            {"id": "c", "text": "forever."}
        ],
        "quotations": [
            {"text": "shall own the Work forever", "category": "high", "explanation": "Perpetual"},
            {"text": "tiny", "category": "low"}
        ]
    }"#;

    #[test]
    fn test_leaves_job_keeps_unanchored_quotations() {
        let output = Job::from_json(LEAVES_JOB)
            .unwrap()
            .execute(&Anchorer::new())
            .unwrap();
        assert_eq!(output.quotations.len(), 2);
        assert!(output.quotations[0].outcome.is_anchored());
        assert_eq!(
            output.quotations[1].outcome,
            QuotationOutcome::Rejected { chars: 4 }
        );
        assert_eq!(output.report.skipped(), 1);
    }

    #[test]
    fn test_leaves_job_markup() {
        let output = Job::from_json(LEAVES_JOB)
            .unwrap()
            .execute(&Anchorer::new())
            .unwrap();
        let markup = output.render(OutputFormat::Markup).unwrap();
        assert!(markup.starts_with("The Publisher <mark "));
        assert!(markup.ends_with(">forever</mark>."));
    }

    #[test]
    fn test_json_output_lists_outcomes() {
        let output = Job::from_json(LEAVES_JOB)
            .unwrap()
            .execute(&Anchorer::new())
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&output.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["quotations"][0]["outcome"]["status"], "anchored");
        assert_eq!(json["quotations"][1]["outcome"]["status"], "rejected");
        assert_eq!(json["quotations"][1]["category"], "low");
        assert!(json.get("tree").is_none());
    }

    #[test]
    fn test_tree_job() {
        let job = Job::from_json(
            r#"{
                "tree": {"tag": "p", "children": ["The Publisher shall own ", {"tag": "i", "children": ["the Work"]}]},
                "quotations": [{"text": "shall own the Work", "category": "high"}]
            }"#,
        )
        .unwrap();
        let output = job.execute(&Anchorer::new()).unwrap();
        assert_eq!(output.report.anchored, 1);
        let markup = output.render(OutputFormat::Markup).unwrap();
        assert!(markup.contains(">shall own </mark><i><mark "));
    }

    #[test]
    fn test_job_needs_exactly_one_document() {
        let neither = Job::from_json(r#"{"quotations": []}"#).unwrap();
        assert!(neither.execute(&Anchorer::new()).is_err());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = Job::from_json("{").unwrap_err();
        assert!(err.to_string().contains("Failed to parse job JSON"));
    }
}
