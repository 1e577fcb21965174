//! Character Extraction: the registry population pass
//!
//! Walks every cue in the transcript once:
//! 1. indentation band + normalization + validity (CandidateFilter)
//! 2. fuzzy near-duplicate of a registered name → discarded as noise
//! 3. substring of a registered name → repeat appearance, not a new entry
//! 4. otherwise registered
//!
//! All identity resolution happens here. Scene processing later trusts the
//! registry as built.

use tracing::{debug, info};

use crate::config::CastConfig;
use crate::error::Result;
use crate::scanner::candidate::CandidateFilter;
use crate::scanner::cue::CueExtractor;
use crate::scanner::normalize::NameNormalizer;
use crate::scanner::registry::CharacterRegistry;
use crate::scanner::similarity::FuzzyMatcher;

/// Outcome counts of one extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExtractionStats {
    pub cues_seen: usize,
    pub rejected: usize,
    pub fuzzy_duplicates: usize,
    pub repeats: usize,
    pub registered: usize,
}

#[derive(Debug, Clone)]
pub struct CastExtractor {
    cues: CueExtractor,
    filter: CandidateFilter,
    normalizer: NameNormalizer,
    matcher: FuzzyMatcher,
}

impl CastExtractor {
    pub fn new(config: &CastConfig) -> Result<Self> {
        Ok(Self {
            cues: CueExtractor::new(&config.cue)?,
            filter: CandidateFilter::new(&config.cue),
            normalizer: NameNormalizer::new(&config.names),
            matcher: FuzzyMatcher::new(&config.dedup),
        })
    }

    pub fn extract(&self, transcript: &str) -> CharacterRegistry {
        self.extract_with_stats(transcript).0
    }

    pub fn extract_with_stats(&self, transcript: &str) -> (CharacterRegistry, ExtractionStats) {
        info!("Extracting the characters...");

        let mut registry = CharacterRegistry::new();
        let mut stats = ExtractionStats::default();

        for pair in self.cues.pairs(transcript) {
            stats.cues_seen += 1;

            let Some(name) = self.filter.accept(pair.cue, &self.normalizer) else {
                stats.rejected += 1;
                continue;
            };

            if let Some(hit) = self.matcher.best_match(&name, registry.names()) {
                if self.matcher.is_duplicate_match(&hit) {
                    debug!(candidate = %name, existing = %hit.existing, ratio = hit.ratio, "possible character already added");
                    stats.fuzzy_duplicates += 1;
                    continue;
                }
            }

            if registry.names().any(|existing| existing.contains(name.as_str())) {
                stats.repeats += 1;
                continue;
            }

            info!(character = %name, "Adding character");
            registry.register(&name);
            stats.registered += 1;
        }

        info!(
            characters = registry.len(),
            cues = stats.cues_seen,
            rejected = stats.rejected,
            "character extraction finished"
        );
        (registry, stats)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(name: &str) -> String {
        format!("<b>{}{}</b>", " ".repeat(25), name)
    }

    fn extractor() -> CastExtractor {
        CastExtractor::new(&CastConfig::default()).unwrap()
    }

    #[test]
    fn test_first_encounter_order() {
        let text = format!(
            "{}Hello.{}Hi.{}Hello again.{}Welcome.<b>EXT. END</b>",
            cue("FRODO"),
            cue("SAM"),
            cue("FRODO (CONT'D)"),
            cue("GANDALF")
        );
        let registry = extractor().extract(&text);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["FRODO", "SAM", "GANDALF"]);
    }

    #[test]
    fn test_split_name_discarded() {
        let text = format!("{}Hello.{}Again.", cue("FRODO"), cue("FRO DO"));
        let (registry, stats) = extractor().extract_with_stats(&text);
        assert_eq!(registry.len(), 1);
        assert_eq!(stats.fuzzy_duplicates, 1);
    }

    #[test]
    fn test_substring_repeat_not_registered() {
        let text = format!("{}Hello.{}Hi.", cue("OLD BILBO"), cue("BILBO"));
        let (registry, stats) = extractor().extract_with_stats(&text);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["OLD BILBO"]);
        assert_eq!(stats.repeats, 1);
    }

    #[test]
    fn test_short_first_token_names() {
        // "OLD BILBO" is compared as "oldbilbo": not close to "bilbo", so it is
        // registered, and its own repeat falls through to the substring check
        let text = format!("{}a{}b{}c", cue("BILBO"), cue("OLD BILBO"), cue("OLD BILBO"));
        let (registry, stats) = extractor().extract_with_stats(&text);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["BILBO", "OLD BILBO"]);
        assert_eq!(stats.fuzzy_duplicates, 0);
        assert_eq!(stats.repeats, 1);
    }

    #[test]
    fn test_compacted_exact_match_discarded() {
        let text = format!("{}a{}b", cue("OLDBILBO"), cue("OLD BILBO"));
        let (registry, stats) = extractor().extract_with_stats(&text);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["OLDBILBO"]);
        assert_eq!(stats.fuzzy_duplicates, 1);
    }

    #[test]
    fn test_rejections() {
        let text = format!(
            "<b>FRODO</b>not centered.{}both.{}nothing.{}ok.",
            cue("MERRY &amp; PIPPIN"),
            cue("(V.O.)"),
            cue("SAM")
        );
        let (registry, stats) = extractor().extract_with_stats(&text);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["SAM"]);
        assert_eq!(stats.rejected, 3);
    }

    #[test]
    fn test_group_cue_rejected_with_punctuation_strip() {
        let mut config = CastConfig::default();
        config.names.strip_chars = "&;".to_string();
        let text = format!("{}both.{}ok.", cue("MERRY &amp; PIPPIN"), cue("SAM"));

        let (registry, stats) = CastExtractor::new(&config).unwrap().extract_with_stats(&text);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["SAM"]);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_headings_never_characters() {
        let text = format!(
            "<b>EXT. SHIRE - DAY</b>{}Hi.<b>INT. BAG END - NIGHT</b><b>SUPER: THE SHIRE</b>",
            cue("BILBO")
        );
        let registry = extractor().extract(&text);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("BILBO"));
    }

    #[test]
    fn test_accents_stripped_in_names() {
        let text = format!("{}Hail.", cue("ÉOWYN"));
        let registry = extractor().extract(&text);
        assert!(registry.contains("EOWYN"));
    }

    #[test]
    fn test_empty_transcript_gives_empty_registry() {
        assert!(extractor().extract("").is_empty());
    }
}
