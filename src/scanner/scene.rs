//! Scene Segmenter
//!
//! A scene starts right after a bolded location marker (`<b>EXT.`, `<b>INT.`)
//! or, for the very first scene only, after `<pre>BLACK SCREEN`. It runs up to
//! the next bolded location marker; the last scene runs to the end of the
//! transcript.

use regex::Regex;

use crate::config::SceneConfig;
use crate::error::{Result, ScriptError};

/// A scene's text and where it begins in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSpan<'a> {
    pub index: usize,
    /// Byte offset of the text (just past the marker)
    pub start: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct SceneSegmenter {
    boundary: Regex,
    opening_marker: String,
}

impl SceneSegmenter {
    pub fn new(config: &SceneConfig) -> Result<Self> {
        let alternatives: Vec<String> = config
            .boundary_markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(m))
            .collect();
        if alternatives.is_empty() {
            return Err(ScriptError::Config("no scene boundary markers configured".to_string()));
        }

        let boundary = Regex::new(&format!("<b>(?:{})", alternatives.join("|")))
            .map_err(|e| ScriptError::Pattern(format!("Failed to build scene pattern: {}", e)))?;

        Ok(Self {
            boundary,
            opening_marker: config.opening_marker.clone(),
        })
    }

    /// Scenes in transcript order. Same input, same output.
    pub fn spans<'a>(&self, transcript: &'a str) -> Vec<SceneSpan<'a>> {
        let boundaries: Vec<(usize, usize)> = self
            .boundary
            .find_iter(transcript)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut starts: Vec<usize> = Vec::with_capacity(boundaries.len() + 1);

        if !self.opening_marker.is_empty() {
            if let Some(pos) = transcript.find(self.opening_marker.as_str()) {
                let first_boundary = boundaries.first().map_or(transcript.len(), |b| b.0);
                if pos < first_boundary {
                    starts.push(pos + self.opening_marker.len());
                }
            }
        }
        starts.extend(boundaries.iter().map(|&(_, end)| end));

        starts
            .iter()
            .enumerate()
            .map(|(index, &start)| {
                let end = boundaries
                    .iter()
                    .map(|&(b, _)| b)
                    .find(|&b| b >= start)
                    .unwrap_or(transcript.len());
                SceneSpan {
                    index,
                    start,
                    text: &transcript[start..end],
                }
            })
            .collect()
    }

    pub fn split<'a>(&self, transcript: &'a str) -> Vec<&'a str> {
        self.spans(transcript).into_iter().map(|s| s.text).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
