//! Canonical text form used for locating quotations
//!
//! Every maximal run of whitespace becomes a single space and every char is
//! lower-cased. Alongside the canonical string we keep, for each canonical
//! byte, the raw byte offset of the char that produced it, so a match found
//! in canonical text can be projected back onto the raw text.

/// Canonical form of a raw text plus the reverse offset map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    raw_offsets: Vec<usize>,
    raw_len: usize,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut raw_offsets = Vec::with_capacity(raw.len());
        let mut in_whitespace = false;

        for (offset, ch) in raw.char_indices() {
            if ch.is_whitespace() {
                // A run keeps one space, mapped to where the run starts
                if !in_whitespace {
                    text.push(' ');
                    raw_offsets.push(offset);
                    in_whitespace = true;
                }
                continue;
            }
            in_whitespace = false;

            for lower in ch.to_lowercase() {
                text.push(lower);
                raw_offsets.resize(text.len(), offset);
            }
        }

        Self {
            text,
            raw_offsets,
            raw_len: raw.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Canonical length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length of the raw text this was built from
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Raw offset behind a canonical byte position. Positions at or past the
    /// end of the canonical text map to the raw length.
    pub fn raw_offset(&self, position: usize) -> usize {
        self.raw_offsets
            .get(position)
            .copied()
            .unwrap_or(self.raw_len)
    }
}

/// Canonical form of a quotation: trimmed, whitespace-collapsed, lower-cased.
pub fn normalize_quotation(text: &str) -> String {
    NormalizedText::new(text.trim()).text
}
