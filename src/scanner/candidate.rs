//! Candidate Filter: is a bold token a character cue?
//!
//! IMSDb centers character cues with 20-30 leading spaces; scene headings and
//! camera directions sit at the left margin. The band is a configuration
//! constant, there is no auto-detection of "centered" text.

use tracing::debug;

use crate::config::CueConfig;
use crate::scanner::normalize::NameNormalizer;

/// Why a raw cue was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Leading spaces outside the accepted band
    Indentation(usize),
    /// Nothing left after normalization
    Empty,
    /// Unparsed `&amp;` group cue ("MERRY &amp; PIPPIN")
    GroupCue,
}

#[derive(Debug, Clone)]
pub struct CandidateFilter {
    min_indent: usize,
    max_indent: usize,
    invalid_marker: String,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new(&CueConfig::default())
    }
}

impl CandidateFilter {
    pub fn new(config: &CueConfig) -> Self {
        Self {
            min_indent: config.min_indent,
            max_indent: config.max_indent,
            invalid_marker: config.invalid_marker.clone(),
        }
    }

    /// Positional check on the raw token (spaces only, tabs do not count)
    pub fn accepts_indent(&self, raw: &str) -> bool {
        let indent = leading_spaces(raw);
        indent >= self.min_indent && indent <= self.max_indent
    }

    /// Validity check on an already normalized name
    pub fn accepts_name(&self, name: &str) -> bool {
        !name.is_empty() && !name.contains(self.invalid_marker.as_str())
    }

    /// Full check: indentation, group marker, then normalization.
    /// Returns the normalized display name when accepted.
    pub fn evaluate(&self, raw: &str, normalizer: &NameNormalizer) -> Result<String, Rejection> {
        let indent = leading_spaces(raw);
        if indent < self.min_indent || indent > self.max_indent {
            return Err(Rejection::Indentation(indent));
        }

        // the marker may be made of stripped punctuation, so look before stripping
        let prepared = normalizer.prepare(raw);
        if prepared.contains(self.invalid_marker.as_str()) {
            return Err(Rejection::GroupCue);
        }

        let name = normalizer.finish(&prepared);
        if name.is_empty() {
            return Err(Rejection::Empty);
        }
        Ok(name)
    }

    /// Like `evaluate`, logging the rejection reason at debug level
    pub fn accept(&self, raw: &str, normalizer: &NameNormalizer) -> Option<String> {
        match self.evaluate(raw, normalizer) {
            Ok(name) => Some(name),
            Err(reason) => {
                debug!(cue = raw.trim(), ?reason, "rejecting cue candidate");
                None
            }
        }
    }
}

pub fn leading_spaces(raw: &str) -> usize {
    raw.len() - raw.trim_start_matches(' ').len()
}

// =============================================================================
// Tests
// =============================================================================
