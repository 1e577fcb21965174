//! Configuration types and defaults for CastCore
//!
//! Defaults are calibrated for IMSDb HTML transcripts: bold character cues
//! centered with 20-30 leading spaces, scene headings introduced by bold
//! `EXT.` / `INT.` markers.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScriptError};

// =============================================================================
// Cue Parameters
// =============================================================================

/// Parameters controlling which bold tokens count as character cues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Minimum leading spaces for a centered cue (inclusive). Default: 20
    pub min_indent: usize,
    /// Maximum leading spaces for a centered cue (inclusive). Default: 30
    pub max_indent: usize,
    /// Bold tokens starting with these are headings, never cues
    pub excluded_prefixes: Vec<String>,
    /// Normalized names containing this marker are group cues ("MERRY &amp; PIPPIN")
    pub invalid_marker: String,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            min_indent: 20,
            max_indent: 30,
            excluded_prefixes: vec!["EXT.".to_string(), "INT.".to_string(), "SUPER".to_string()],
            invalid_marker: "&amp;".to_string(),
        }
    }
}

impl CueConfig {
    /// Same exclusions, different indentation band
    pub fn with_band(min_indent: usize, max_indent: usize) -> Self {
        Self {
            min_indent,
            max_indent,
            ..Self::default()
        }
    }
}

// =============================================================================
// Name Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    /// Characters removed from names. Empty disables punctuation stripping.
    pub strip_chars: String,
    /// Replace accented letters with plain ASCII equivalents
    pub transliterate: bool,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            strip_chars: String::new(),
            transliterate: true,
        }
    }
}

// =============================================================================
// Dedup Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// A candidate is a near-duplicate when similarity is strictly above this. Default: 0.9
    pub similarity_threshold: f64,
    /// First tokens up to this length are compared with spaces removed. Default: 3
    pub short_token_len: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.9,
            short_token_len: 3,
        }
    }
}

// =============================================================================
// Scene Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Marker allowed only as the very first scene start
    pub opening_marker: String,
    /// Bolded markers that start a new scene (matched right after `<b>`)
    pub boundary_markers: Vec<String>,
    /// Process at most this many scenes. None processes all of them.
    pub max_scenes: Option<usize>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            opening_marker: "<pre>BLACK SCREEN".to_string(),
            boundary_markers: vec!["EXT.".to_string(), "INT.".to_string()],
            max_scenes: None,
        }
    }
}

// =============================================================================
// Loader Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Everything up to and including this marker is page header.
    /// None keeps the whole file.
    pub header_marker: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            header_marker: Some("<br> <table width=\"100%\">".to_string()),
        }
    }
}

// =============================================================================
// Export Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Rows are emitted only for characters seen in at least this many scenes. Default: 2
    pub min_scene_appearances: usize,
    /// Script title stamped on every exported row and on the JSON report
    pub title: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            min_scene_appearances: 2,
            title: None,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    pub cue: CueConfig,
    pub names: NameConfig,
    pub dedup: DedupConfig,
    pub scenes: SceneConfig,
    pub loader: LoaderConfig,
    pub export: ExportConfig,
}

impl CastConfig {
    /// IMSDb layout (the default)
    pub fn imsdb() -> Self {
        Self::default()
    }

    /// Raw markup without an IMSDb page header; exports every character
    pub fn bare() -> Self {
        Self {
            loader: LoaderConfig { header_marker: None },
            export: ExportConfig {
                min_scene_appearances: 0,
                ..ExportConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CastConfig =
            toml::from_str(text).map_err(|e| ScriptError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cue.min_indent > self.cue.max_indent {
            return Err(ScriptError::Config(format!(
                "cue.min_indent ({}) exceeds cue.max_indent ({})",
                self.cue.min_indent, self.cue.max_indent
            )));
        }
        if !(0.0..=1.0).contains(&self.dedup.similarity_threshold) {
            return Err(ScriptError::Config(format!(
                "dedup.similarity_threshold must be within [0, 1], got {}",
                self.dedup.similarity_threshold
            )));
        }
        if self.scenes.boundary_markers.iter().all(|m| m.is_empty()) {
            return Err(ScriptError::Config(
                "scenes.boundary_markers must name at least one marker".to_string(),
            ));
        }
        if self.cue.invalid_marker.is_empty() {
            return Err(ScriptError::Config("cue.invalid_marker must not be empty".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
