//! Scene Interaction Processor
//!
//! Walks one scene's cue/body pairs in order, collecting the active speakers
//! and recording who names whom, then applies the speaker list to the
//! registry as co-occurrence edges and scene appearances.
//!
//! Identity is never re-resolved here: a speaker missing from the registry
//! still counts as active but gains nothing.

use tracing::debug;

use crate::config::CastConfig;
use crate::error::Result;
use crate::scanner::candidate::CandidateFilter;
use crate::scanner::cue::CueExtractor;
use crate::scanner::mention::MentionCortex;
use crate::scanner::normalize::NameNormalizer;
use crate::scanner::registry::CharacterRegistry;

#[derive(Debug, Clone)]
pub struct SceneProcessor {
    cues: CueExtractor,
    filter: CandidateFilter,
    normalizer: NameNormalizer,
}

impl SceneProcessor {
    pub fn new(config: &CastConfig) -> Result<Self> {
        Ok(Self {
            cues: CueExtractor::new(&config.cue)?,
            filter: CandidateFilter::new(&config.cue),
            normalizer: NameNormalizer::new(&config.names),
        })
    }

    /// Mention automaton over the registry as it stands. Registry names do not
    /// change during scene processing, so one build serves every scene.
    pub fn mention_index(registry: &CharacterRegistry) -> Result<MentionCortex> {
        MentionCortex::build(registry.names())
    }

    /// Process one scene, building a throwaway mention index
    pub fn process(
        &self,
        scene: &str,
        registry: &mut CharacterRegistry,
        index: usize,
    ) -> Result<Vec<String>> {
        let mentions = Self::mention_index(registry)?;
        Ok(self.process_with(scene, registry, &mentions, index))
    }

    /// Process one scene against a prebuilt mention index.
    /// Returns the active speakers in order of first appearance.
    pub fn process_with(
        &self,
        scene: &str,
        registry: &mut CharacterRegistry,
        mentions: &MentionCortex,
        index: usize,
    ) -> Vec<String> {
        let mut speakers: Vec<String> = Vec::new();

        for pair in self.cues.pairs(scene) {
            // a rejected cue drops its body too
            let Some(speaker) = self.filter.accept(pair.cue, &self.normalizer) else {
                continue;
            };

            for mentioned in mentions.mentioned(pair.body) {
                registry.record_mention(&speaker, mentioned);
            }

            if !speakers.contains(&speaker) {
                speakers.push(speaker);
            }
        }

        registry.record_scene(&speakers, index);
        debug!(scene = index, speakers = ?speakers, "scene processed");
        speakers
    }
}

// =============================================================================
// Tests
// =============================================================================
