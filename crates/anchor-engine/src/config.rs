//! Tunables for quotation anchoring
//!
//! Configuration can be built in code, parsed from TOML, or loaded from a
//! TOML file. Every field has a default, so an empty document is valid.

use crate::error::{AnchorError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a quotation is treated when its match overlaps text already
/// claimed by a quotation earlier in priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Keep only the unclaimed remainder of the later match
    #[default]
    Clip,
    /// Discard the later match entirely on any overlap
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Quotations shorter than this (in chars, after trimming and
    /// whitespace collapsing) are rejected without searching
    pub min_quote_chars: usize,
    /// Length in chars of the prefix tried when the full quotation is missing
    pub fallback_prefix_chars: usize,
    pub fallback_enabled: bool,
    pub overlap_policy: OverlapPolicy,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            min_quote_chars: 10,
            fallback_prefix_chars: 50,
            fallback_enabled: true,
            overlap_policy: OverlapPolicy::Clip,
        }
    }
}

impl AnchorConfig {
    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use anchor_engine::config::{AnchorConfig, OverlapPolicy};
    ///
    /// let config = AnchorConfig::from_toml(r#"
    ///     min_quote_chars = 12
    ///     overlap_policy = "drop"
    /// "#).unwrap();
    /// assert_eq!(config.min_quote_chars, 12);
    /// assert_eq!(config.fallback_prefix_chars, 50);
    /// assert_eq!(config.overlap_policy, OverlapPolicy::Drop);
    /// ```
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| AnchorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or a value fails validation
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_quote_chars == 0 {
            return Err(AnchorError::InvalidConfig(
                "min_quote_chars must be at least 1".to_string(),
            ));
        }
        if self.fallback_prefix_chars == 0 {
            return Err(AnchorError::InvalidConfig(
                "fallback_prefix_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_min_quote_chars(mut self, chars: usize) -> Self {
        self.min_quote_chars = chars;
        self
    }

    pub fn with_fallback_prefix_chars(mut self, chars: usize) -> Self {
        self.fallback_prefix_chars = chars;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }
}
