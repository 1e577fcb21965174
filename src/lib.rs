//! CastCore: Screenplay Cast Scanner + Interaction Graph
//!
//! A Rust/WASM pipeline that turns an IMSDb-style HTML screenplay into a
//! deduplicated character registry with per-character scene appearances,
//! co-occurrence counts and mentions-by-name.
//!
//! # Architecture
//!
//! ## Scanner Components
//! - `normalize.rs` - NameNormalizer: annotation stripping, transliteration, whitespace
//! - `candidate.rs` - CandidateFilter: indentation band + validity checks on cues
//! - `similarity.rs` - FuzzyMatcher: Ratcliff/Obershelp near-duplicate detection
//! - `cue.rs` - CueExtractor: bold cue / dialogue body pairs
//! - `registry.rs` - CharacterRegistry: the cast and its counters
//! - `extract.rs` - CastExtractor: registry population pass
//! - `scene.rs` - SceneSegmenter: location-heading scene spans
//! - `mention.rs` - MentionCortex: name matching via Aho-Corasick
//! - `interaction.rs` - SceneProcessor: per-scene interactions and mentions
//! - `script.rs` - ScriptCortex: **one call** from transcript to analysis
//!
//! ## Around the scanner
//! - `loader.rs` - transcript loading and header stripping
//! - `resolve.rs` - name resolution / gender lookup interfaces
//! - `network.rs` - centrality and communities over the interaction graph
//! - `export.rs` - CSV tables and JSON reports
//!
//! # Usage (Rust)
//! ```rust,ignore
//! use castcore::{CastConfig, ScriptCortex};
//!
//! let config = CastConfig::imsdb();
//! let transcript = castcore::load_transcript("lotr.html", &config.loader)?;
//! let analysis = ScriptCortex::new(config)?.analyze(&transcript)?;
//!
//! let frodo = analysis.registry.get("FRODO").unwrap();
//! println!("{:?}", frodo.interaction_counts());
//! ```
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { ScriptCortex } from 'castcore';
//!
//! await init();
//! const cortex = new ScriptCortex();
//! const result = cortex.analyze(transcriptText);
//! console.log(result.registry);  // characters with counts
//! console.log(result.stats);     // timing per phase
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod network;
pub mod resolve;
pub mod scanner;

// Public exports - Scanner
pub use scanner::*;

pub use config::*;
pub use error::{Result, ScriptError};
pub use export::{to_json, write_csv, ExportTables};
pub use loader::{load_transcript, prepare_transcript};
pub use network::{CastGraph, NetworkMetrics};
pub use resolve::{enrich_registry, merge_resolved_duplicates, DirectoryResolver, GenderLookup, NameResolver};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("castcore v{}", env!("CARGO_PKG_VERSION"))
}
