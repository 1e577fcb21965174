//! Transcript loader
//!
//! IMSDb pages carry a navigation header before the script proper. The loader
//! joins the page onto one line and cuts everything up to the header marker.

use std::path::Path;

use tracing::info;

use crate::config::LoaderConfig;
use crate::error::{Result, ScriptError};

pub fn load_transcript(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<String> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = raw.len(), "Loading transcript");
    prepare_transcript(&raw, config)
}

/// Strip line breaks and the page header. Missing marker or nothing left
/// afterwards is fatal.
pub fn prepare_transcript(raw: &str, config: &LoaderConfig) -> Result<String> {
    let joined: String = raw.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    let body = match config.header_marker.as_deref().filter(|m| !m.is_empty()) {
        Some(marker) => match joined.find(marker) {
            Some(pos) => &joined[pos + marker.len()..],
            None => {
                return Err(ScriptError::MissingMarker {
                    marker: marker.to_string(),
                })
            }
        },
        None => joined.as_str(),
    };

    if body.trim().is_empty() {
        return Err(ScriptError::EmptyTranscript);
    }
    Ok(body.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "<br> <table width=\"100%\">";

    #[test]
    fn test_header_removed() {
        let raw = format!("<html>nav\nlinks{}<pre>\n<b>EXT. SHIRE</b>\nhills", MARKER);
        let text = prepare_transcript(&raw, &LoaderConfig::default()).unwrap();
        assert_eq!(text, "<pre><b>EXT. SHIRE</b>hills");
    }

    #[test]
    fn test_only_first_marker_cut() {
        let raw = format!("head{}one{}two", MARKER, MARKER);
        let text = prepare_transcript(&raw, &LoaderConfig::default()).unwrap();
        assert_eq!(text, format!("one{}two", MARKER));
    }

    #[test]
    fn test_missing_marker_is_fatal() {
        let err = prepare_transcript("<b>EXT. SHIRE</b>", &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::MissingMarker { .. }));
    }

    #[test]
    fn test_empty_is_fatal() {
        let config = LoaderConfig { header_marker: None };
        assert!(matches!(prepare_transcript("\r\n\n", &config), Err(ScriptError::EmptyTranscript)));

        let raw = format!("header{}\n   \n", MARKER);
        assert!(matches!(
            prepare_transcript(&raw, &LoaderConfig::default()),
            Err(ScriptError::EmptyTranscript)
        ));
    }

    #[test]
    fn test_no_marker_configured_keeps_everything() {
        let config = LoaderConfig { header_marker: None };
        let text = prepare_transcript("a\nb\r\nc", &config).unwrap();
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_transcript("/nonexistent/script.html", &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }
}
