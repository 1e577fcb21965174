//! MentionCortex: which registered names occur in a line of dialogue
//!
//! Uses Aho-Corasick over the lowercased display names, with overlapping
//! search so a name that is a substring of another ("SAM" in "SAMWISE")
//! still counts. A name counts once per line however often it appears.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::error::{Result, ScriptError};

#[derive(Debug, Clone, Default)]
pub struct MentionCortex {
    automaton: Option<AhoCorasick>,
    /// Display names, indexed by pattern id
    names: Vec<String>,
}

impl MentionCortex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the automaton for the given display names (empty names skipped)
    pub fn build<'a, I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Ok(Self::new());
        }

        let patterns: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| ScriptError::Pattern(format!("Failed to build automaton: {}", e)))?;

        Ok(Self {
            automaton: Some(automaton),
            names,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.names.len()
    }

    /// Names occurring (case-insensitively) in `body`, in registry order
    pub fn mentioned<'s>(&'s self, body: &str) -> Vec<&'s str> {
        let Some(automaton) = &self.automaton else {
            return vec![];
        };
        if body.is_empty() {
            return vec![];
        }

        let lowered = body.to_lowercase();
        let mut hit = vec![false; self.names.len()];
        for mat in automaton.find_overlapping_iter(&lowered) {
            hit[mat.pattern().as_usize()] = true;
        }

        self.names
            .iter()
            .zip(hit)
            .filter_map(|(name, found)| found.then_some(name.as_str()))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_mentions() {
        let cortex = MentionCortex::build(["FRODO", "SAM", "GANDALF"]).unwrap();
        assert_eq!(cortex.mentioned("Go find Gandalf, Sam."), vec!["SAM", "GANDALF"]);
    }

    #[test]
    fn test_counts_once_per_line() {
        let cortex = MentionCortex::build(["SAM"]).unwrap();
        assert_eq!(cortex.mentioned("Sam! Sam! SAM!"), vec!["SAM"]);
    }

    #[test]
    fn test_overlapping_names() {
        let cortex = MentionCortex::build(["SAM", "SAMWISE"]).unwrap();
        assert_eq!(cortex.mentioned("Samwise the Brave"), vec!["SAM", "SAMWISE"]);
    }

    #[test]
    fn test_substring_semantics() {
        // plain substring test, no word boundaries
        let cortex = MentionCortex::build(["PIP"]).unwrap();
        assert_eq!(cortex.mentioned("Pippin!"), vec!["PIP"]);
    }

    #[test]
    fn test_empty_inputs() {
        let empty = MentionCortex::build(std::iter::empty()).unwrap();
        assert_eq!(empty.pattern_count(), 0);
        assert!(empty.mentioned("Frodo").is_empty());

        let cortex = MentionCortex::build(["FRODO", ""]).unwrap();
        assert_eq!(cortex.pattern_count(), 1);
        assert!(cortex.mentioned("").is_empty());
    }
}
