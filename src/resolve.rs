//! Name resolution and gender lookup
//!
//! Both are external services (a wiki search, a knowledge base). The core only
//! sees the two traits below; failures are recovered into sentinels here and
//! never reach the pipeline.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{Result, ScriptError};
use crate::scanner::normalize::{collapse_whitespace, strip_diacritics, truncate_annotation};
use crate::scanner::registry::{CharacterRegistry, Gender};

/// Marker of a search result that is an index page, not a character
const LIST_PAGE_MARKER: &str = "List of";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub trait NameResolver {
    /// Canonical name for a cue-derived display name, if the service knows one.
    /// `category` narrows the search (a franchise or wiki name).
    fn resolve(&self, display_name: &str, category: &str) -> std::result::Result<Option<String>, ResolveError>;
}

pub trait GenderLookup {
    fn gender(&self, resolved_name: &str) -> std::result::Result<Gender, ResolveError>;
}

/// Clean a raw resolver answer. Index pages and empty answers are no resolution.
pub fn sanitize_resolved_name(raw: &str) -> Option<String> {
    if raw.contains(LIST_PAGE_MARKER) {
        return None;
    }
    let name = collapse_whitespace(&strip_diacritics(truncate_annotation(raw)));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

// =============================================================================
// Enrichment
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnrichmentStats {
    pub resolved: usize,
    pub unresolved: usize,
    pub gendered: usize,
    pub failures: usize,
}

/// Fill `resolved_name` and `gender` for every character. Service errors
/// leave the sentinels (None / Unknown) in place.
pub fn enrich_registry(
    registry: &mut CharacterRegistry,
    resolver: &dyn NameResolver,
    lookup: &dyn GenderLookup,
    category: &str,
) -> EnrichmentStats {
    info!(characters = registry.len(), category, "Resolving character names...");
    let mut stats = EnrichmentStats::default();

    for character in registry.iter_mut() {
        let resolved = match resolver.resolve(character.display_name(), category) {
            Ok(answer) => answer.as_deref().and_then(sanitize_resolved_name),
            Err(e) => {
                warn!(character = character.display_name(), error = %e, "name resolution failed");
                stats.failures += 1;
                None
            }
        };

        let Some(resolved) = resolved else {
            stats.unresolved += 1;
            character.resolved_name = None;
            character.gender = Gender::Unknown;
            continue;
        };

        debug!(character = character.display_name(), resolved = %resolved, "resolved");
        stats.resolved += 1;

        character.gender = match lookup.gender(&resolved) {
            Ok(gender) => gender,
            Err(e) => {
                warn!(resolved = %resolved, error = %e, "gender lookup failed");
                stats.failures += 1;
                Gender::Unknown
            }
        };
        if character.gender != Gender::Unknown {
            stats.gendered += 1;
        }
        character.resolved_name = Some(resolved);
    }

    stats
}

/// Drop characters whose resolved name was already taken by an earlier one.
/// Unresolved characters are always kept. Returns how many were dropped.
pub fn merge_resolved_duplicates(registry: &mut CharacterRegistry) -> usize {
    let before = registry.len();
    let mut seen: HashSet<String> = HashSet::new();
    registry.retain(|c| match &c.resolved_name {
        Some(name) => {
            let keep = seen.insert(name.to_lowercase());
            if !keep {
                debug!(character = c.display_name(), resolved = %name, "merged into earlier character");
            }
            keep
        }
        None => true,
    });
    before - registry.len()
}

// =============================================================================
// DirectoryResolver
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
struct DirectoryEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

/// Offline resolver backed by a JSON map of display name to
/// `{ "name": ..., "gender": ... }`. Lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct DirectoryResolver {
    names: HashMap<String, String>,
    genders: HashMap<String, Gender>,
}

impl DirectoryResolver {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let entries: HashMap<String, DirectoryEntry> = serde_json::from_str(text)
            .map_err(|e| ScriptError::Config(format!("invalid character directory: {}", e)))?;

        let mut directory = Self::default();
        for (key, entry) in entries {
            let Some(name) = entry.name.filter(|n| !n.trim().is_empty()) else {
                continue;
            };
            if let Some(label) = entry.gender {
                // keyed the way enrichment will ask for it
                let gender_key = sanitize_resolved_name(&name).unwrap_or_else(|| name.clone());
                directory.genders.insert(gender_key.to_lowercase(), Gender::from_label(&label));
            }
            directory.names.insert(key.trim().to_uppercase(), name);
        }
        Ok(directory)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameResolver for DirectoryResolver {
    fn resolve(&self, display_name: &str, _category: &str) -> std::result::Result<Option<String>, ResolveError> {
        Ok(self.names.get(&display_name.trim().to_uppercase()).cloned())
    }
}

impl GenderLookup for DirectoryResolver {
    fn gender(&self, resolved_name: &str) -> std::result::Result<Gender, ResolveError> {
        Ok(self
            .genders
            .get(&resolved_name.to_lowercase())
            .copied()
            .unwrap_or(Gender::Unknown))
    }
}

// =============================================================================
// Tests
// =============================================================================
