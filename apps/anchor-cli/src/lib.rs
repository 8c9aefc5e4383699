//! Anchor CLI
//!
//! Runs the anchor engine over a JSON job: a document (flat leaves or an
//! element tree) plus the quotations to place on it.

pub mod job;
pub mod tree;

pub use job::{Job, JobOutput, OutputFormat};
