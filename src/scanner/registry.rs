//! Character Registry
//!
//! The canonical, deduplicated cast plus per-character mutable state:
//! interaction counts, mention counts and scene appearances.
//!
//! Populated once by the extraction pass, then only mutated (counts and scene
//! lists grow) by sequential scene processing. The mutators enforce the
//! invariants: unique non-empty display names, no self-mentions, no self
//! interactions, no repeated scene indices.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// =============================================================================
// Core Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unknown
    }
}

impl Gender {
    /// Parse a lookup label. "nogender" and anything unrecognized is Unknown.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

/// A single cast member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Character {
    /// 1-based registration order
    pub id: usize,
    display_name: String,
    /// Canonical name from an external resolver, when one was found
    pub resolved_name: Option<String>,
    pub gender: Gender,
    interaction_counts: BTreeMap<String, u32>,
    mention_counts: BTreeMap<String, u32>,
    appeared_scenes: Vec<usize>,
}

impl Character {
    fn new(id: usize, display_name: String) -> Self {
        Self {
            id,
            display_name,
            resolved_name: None,
            gender: Gender::Unknown,
            interaction_counts: BTreeMap::new(),
            mention_counts: BTreeMap::new(),
            appeared_scenes: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn interaction_counts(&self) -> &BTreeMap<String, u32> {
        &self.interaction_counts
    }

    pub fn mention_counts(&self) -> &BTreeMap<String, u32> {
        &self.mention_counts
    }

    pub fn appeared_scenes(&self) -> &[usize] {
        &self.appeared_scenes
    }

    pub fn scene_count(&self) -> usize {
        self.appeared_scenes.len()
    }

    /// Count one interaction with `other`. Self-interactions are ignored.
    pub fn add_interaction(&mut self, other: &str) -> bool {
        if other == self.display_name {
            return false;
        }
        *self.interaction_counts.entry(other.to_string()).or_insert(0) += 1;
        true
    }

    /// Count one line in which this character named `name`.
    /// Self-mentions are never recorded.
    pub fn add_mention(&mut self, name: &str) -> bool {
        if name == self.display_name {
            return false;
        }
        *self.mention_counts.entry(name.to_string()).or_insert(0) += 1;
        debug!(speaker = %self.display_name, mentioned = name, "mention");
        true
    }

    /// Record an appearance. A scene is listed at most once.
    pub fn add_appeared_scene(&mut self, scene: usize) -> bool {
        if self.appeared_scenes.contains(&scene) {
            return false;
        }
        self.appeared_scenes.push(scene);
        debug!(character = %self.display_name, scene, "appears in scene");
        true
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
    index: HashMap<String, usize>,
    next_id: usize,
}

impl Serialize for CharacterRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.characters)
    }
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Add a character. Returns None for an empty name or one already present.
    pub fn register(&mut self, display_name: &str) -> Option<&Character> {
        if display_name.is_empty() || self.index.contains_key(display_name) {
            return None;
        }
        self.next_id += 1;
        let idx = self.characters.len();
        self.characters.push(Character::new(self.next_id, display_name.to_string()));
        self.index.insert(display_name.to_string(), idx);
        self.characters.last()
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.index.contains_key(display_name)
    }

    pub fn get(&self, display_name: &str) -> Option<&Character> {
        self.index.get(display_name).map(|&i| &self.characters[i])
    }

    pub fn get_mut(&mut self, display_name: &str) -> Option<&mut Character> {
        match self.index.get(display_name) {
            Some(&i) => self.characters.get_mut(i),
            None => None,
        }
    }

    /// Characters in first-encounter order
    pub fn iter(&self) -> std::slice::Iter<'_, Character> {
        self.characters.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Character> {
        self.characters.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.display_name.as_str())
    }

    /// Drop every character for which `keep` returns false. Ids are stable.
    pub fn retain<F: FnMut(&Character) -> bool>(&mut self, keep: F) {
        self.characters.retain(keep);
        self.index = self
            .characters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.display_name.clone(), i))
            .collect();
    }

    /// `speaker` named `mentioned` in one line. Unknown speakers and
    /// self-mentions are ignored.
    pub fn record_mention(&mut self, speaker: &str, mentioned: &str) -> bool {
        if !self.contains(mentioned) {
            return false;
        }
        match self.get_mut(speaker) {
            Some(character) => character.add_mention(mentioned),
            None => false,
        }
    }

    /// Apply one scene's active-speaker list.
    ///
    /// With fewer than two speakers nothing is recorded. Otherwise every
    /// registered speaker gains one interaction per other registered speaker
    /// and the scene index is appended to its appearances.
    pub fn record_scene(&mut self, speakers: &[String], scene: usize) {
        if speakers.len() <= 1 {
            return;
        }

        let present: Vec<&String> = speakers.iter().filter(|s| self.contains(s)).collect();

        for speaker in &present {
            let Some(&idx) = self.index.get(speaker.as_str()) else {
                continue;
            };
            let character = &mut self.characters[idx];
            let mut partners = Vec::new();
            for other in &present {
                if character.add_interaction(other) {
                    partners.push(other.as_str());
                }
            }
            debug!(character = %character.display_name, with = ?partners, "interactions");
            character.add_appeared_scene(scene);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
