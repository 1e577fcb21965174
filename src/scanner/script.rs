//! ScriptCortex: one call from transcript to populated registry
//!
//! Phases, strictly in order:
//! 1. precondition check (an empty transcript is fatal)
//! 2. character extraction over the whole transcript
//! 3. optional enrichment hook (name resolution, merging)
//! 4. scene segmentation
//! 5. sequential scene processing, one scene at a time
//!
//! Designed for WASM with a single cross-boundary call per analysis.

use serde::Serialize;
use tracing::info;
use wasm_bindgen::prelude::*;

use crate::config::CastConfig;
use crate::error::{Result, ScriptError};
use crate::scanner::extract::{CastExtractor, ExtractionStats};
use crate::scanner::interaction::SceneProcessor;
use crate::scanner::registry::CharacterRegistry;
use crate::scanner::scene::SceneSegmenter;

// =============================================================================
// Types
// =============================================================================

/// Timing statistics for each phase
#[derive(Debug, Clone, Serialize, Default)]
pub struct ScanTimings {
    pub total_us: u64,
    pub extraction_us: u64,
    pub enrichment_us: u64,
    pub segmentation_us: u64,
    pub scenes_us: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ScanStats {
    pub timings: ScanTimings,
    pub extraction: ExtractionStats,
    pub characters: usize,
    pub scenes_found: usize,
    pub scenes_processed: usize,
}

/// Active speakers of one processed scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub index: usize,
    pub speakers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ScriptAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub registry: CharacterRegistry,
    pub scenes: Vec<SceneSummary>,
    pub stats: ScanStats,
}

// =============================================================================
// ScriptCortex
// =============================================================================

#[wasm_bindgen]
pub struct ScriptCortex {
    config: CastConfig,
    extractor: CastExtractor,
    segmenter: SceneSegmenter,
    processor: SceneProcessor,
}

#[wasm_bindgen]
impl ScriptCortex {
    /// Cortex with the IMSDb defaults (JS binding)
    #[wasm_bindgen(constructor)]
    pub fn js_new() -> std::result::Result<ScriptCortex, JsValue> {
        Self::new(CastConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Cortex from a TOML configuration string (JS binding)
    #[wasm_bindgen(js_name = fromToml)]
    pub fn js_from_toml(text: &str) -> std::result::Result<ScriptCortex, JsValue> {
        CastConfig::from_toml_str(text)
            .and_then(Self::new)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Full analysis of an already loaded transcript (JS binding)
    #[wasm_bindgen(js_name = analyze)]
    pub fn js_analyze(&self, transcript: &str) -> std::result::Result<JsValue, JsValue> {
        let analysis = self
            .analyze(transcript)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        match serde_wasm_bindgen::to_value(&analysis) {
            Ok(v) => Ok(v),
            Err(e) => {
                web_sys::console::error_1(&format!("[ScriptCortex] Serialization failed: {:?}", e).into());
                Ok(JsValue::NULL)
            }
        }
    }
}

impl ScriptCortex {
    pub fn new(config: CastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: CastExtractor::new(&config)?,
            segmenter: SceneSegmenter::new(&config.scenes)?,
            processor: SceneProcessor::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &CastConfig {
        &self.config
    }

    pub fn analyze(&self, transcript: &str) -> Result<ScriptAnalysis> {
        self.analyze_with(transcript, |_| {})
    }

    /// Like `analyze`, running `enrich` on the freshly extracted registry
    /// before any scene is processed. No character may be added by `enrich`
    /// that extraction did not produce; removing characters is fine.
    pub fn analyze_with<F>(&self, transcript: &str, enrich: F) -> Result<ScriptAnalysis>
    where
        F: FnOnce(&mut CharacterRegistry),
    {
        if transcript.trim().is_empty() {
            return Err(ScriptError::EmptyTranscript);
        }

        let overall_start = instant::Instant::now();
        let mut stats = ScanStats::default();

        // Phase 1: extraction
        let extraction_start = instant::Instant::now();
        let (mut registry, extraction) = self.extractor.extract_with_stats(transcript);
        stats.timings.extraction_us = extraction_start.elapsed().as_micros() as u64;
        stats.extraction = extraction;

        // Phase 2: enrichment
        let enrichment_start = instant::Instant::now();
        enrich(&mut registry);
        stats.timings.enrichment_us = enrichment_start.elapsed().as_micros() as u64;

        // Phase 3: segmentation
        info!("Segmenting scenes...");
        let segmentation_start = instant::Instant::now();
        let spans = self.segmenter.spans(transcript);
        stats.timings.segmentation_us = segmentation_start.elapsed().as_micros() as u64;
        stats.scenes_found = spans.len();

        // Phase 4: scenes, in index order
        let scenes_start = instant::Instant::now();
        let mentions = SceneProcessor::mention_index(&registry)?;
        let limit = self.config.scenes.max_scenes.unwrap_or(usize::MAX);
        let mut scenes = Vec::with_capacity(spans.len().min(limit));

        for span in spans.iter().take(limit) {
            let speakers = self
                .processor
                .process_with(span.text, &mut registry, &mentions, span.index);
            scenes.push(SceneSummary {
                index: span.index,
                speakers,
            });
        }
        stats.timings.scenes_us = scenes_start.elapsed().as_micros() as u64;
        stats.scenes_processed = scenes.len();
        stats.characters = registry.len();

        stats.timings.total_us = overall_start.elapsed().as_micros() as u64;
        info!(
            characters = stats.characters,
            scenes = stats.scenes_processed,
            total_us = stats.timings.total_us,
            "analysis finished"
        );

        Ok(ScriptAnalysis {
            title: self.config.export.title.clone(),
            registry,
            scenes,
            stats,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
