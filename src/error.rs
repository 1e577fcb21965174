//! Error types for CastCore
//!
//! Only fatal conditions live here. A cue rejected by the filters is not an
//! error, it is simply missing from the registry.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    /// Transcript is empty (or only whitespace) after loading
    #[error("empty transcript: nothing to scan")]
    EmptyTranscript,

    /// Transcript lacks the structural marker that separates header from script
    #[error("transcript is missing the expected marker: {marker:?}")]
    MissingMarker { marker: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to build a matcher (regex or automaton)
    #[error("pattern build failed: {0}")]
    Pattern(String),

    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, ScriptError>;

impl From<csv::Error> for ScriptError {
    fn from(e: csv::Error) -> Self {
        ScriptError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(e: serde_json::Error) -> Self {
        ScriptError::Export(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_marker_message_names_marker() {
        let err = ScriptError::MissingMarker { marker: "<br>".to_string() };
        assert!(err.to_string().contains("<br>"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;
        let err = ScriptError::Io {
            path: PathBuf::from("missing.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("missing.html"));
        assert!(err.source().is_some());
    }
}
