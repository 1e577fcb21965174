//! Export sinks
//!
//! Flat tables read from a finished registry: one row per character, one per
//! interacting pair, one per (speaker, mentioned) pair. Rows only include
//! characters seen in at least `min_scene_appearances` scenes, on both ends.
//! Every row carries the configured script title so tables from several
//! scripts can be concatenated.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ExportConfig;
use crate::error::{Result, ScriptError};
use crate::network::NetworkMetrics;
use crate::scanner::registry::{Character, CharacterRegistry, Gender};
use crate::scanner::script::ScriptAnalysis;

pub const CHARACTERS_FILE: &str = "characters.csv";
pub const INTERACTIONS_FILE: &str = "interactions.csv";
pub const MENTIONS_FILE: &str = "mentions.csv";

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterRow {
    pub id: usize,
    pub name: String,
    pub resolved_name: Option<String>,
    pub gender: Gender,
    pub scene_count: usize,
    /// Scene indices, space separated
    pub scenes: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionRow {
    pub source: String,
    pub target: String,
    pub count: u32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionRow {
    pub speaker: String,
    pub mentioned: String,
    pub count: u32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportTables {
    pub characters: Vec<CharacterRow>,
    pub interactions: Vec<InteractionRow>,
    pub mentions: Vec<MentionRow>,
}

impl ExportTables {
    pub fn build(registry: &CharacterRegistry, config: &ExportConfig) -> Self {
        Self {
            characters: character_rows(registry, config),
            interactions: interaction_rows(registry, config),
            mentions: mention_rows(registry, config),
        }
    }
}

fn exported<'a>(registry: &'a CharacterRegistry, config: &ExportConfig) -> impl Iterator<Item = &'a Character> {
    let min = config.min_scene_appearances;
    registry.iter().filter(move |c| c.scene_count() >= min)
}

fn is_exported(registry: &CharacterRegistry, name: &str, config: &ExportConfig) -> bool {
    registry
        .get(name)
        .is_some_and(|c| c.scene_count() >= config.min_scene_appearances)
}

pub fn character_rows(registry: &CharacterRegistry, config: &ExportConfig) -> Vec<CharacterRow> {
    exported(registry, config)
        .map(|c| CharacterRow {
            id: c.id,
            name: c.display_name().to_string(),
            resolved_name: c.resolved_name.clone(),
            gender: c.gender,
            scene_count: c.scene_count(),
            scenes: c
                .appeared_scenes()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            title: config.title.clone(),
        })
        .collect()
}

/// Each unordered pair once, the earlier registered character as source
pub fn interaction_rows(registry: &CharacterRegistry, config: &ExportConfig) -> Vec<InteractionRow> {
    let mut rows = Vec::new();
    for character in exported(registry, config) {
        for (other, &count) in character.interaction_counts() {
            let Some(partner) = registry.get(other) else {
                continue;
            };
            if partner.id <= character.id || !is_exported(registry, other, config) {
                continue;
            }
            rows.push(InteractionRow {
                source: character.display_name().to_string(),
                target: other.clone(),
                count,
                title: config.title.clone(),
            });
        }
    }
    rows
}

pub fn mention_rows(registry: &CharacterRegistry, config: &ExportConfig) -> Vec<MentionRow> {
    exported(registry, config)
        .flat_map(move |c| {
            c.mention_counts()
                .iter()
                .filter(move |(name, _)| is_exported(registry, name, config))
                .map(move |(name, &count)| MentionRow {
                    speaker: c.display_name().to_string(),
                    mentioned: name.clone(),
                    count,
                    title: config.title.clone(),
                })
        })
        .collect()
}

// =============================================================================
// Writers
// =============================================================================

fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Write the three tables into `dir` (created if missing). Returns the paths.
pub fn write_csv(dir: impl AsRef<Path>, tables: &ExportTables) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ScriptError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let characters = dir.join(CHARACTERS_FILE);
    let interactions = dir.join(INTERACTIONS_FILE);
    let mentions = dir.join(MENTIONS_FILE);

    write_table(&characters, &tables.characters)?;
    write_table(&interactions, &tables.interactions)?;
    write_table(&mentions, &tables.mentions)?;

    info!(
        dir = %dir.display(),
        characters = tables.characters.len(),
        interactions = tables.interactions.len(),
        mentions = tables.mentions.len(),
        "tables written"
    );
    Ok(vec![characters, interactions, mentions])
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    version: &'static str,
    #[serde(flatten)]
    analysis: &'a ScriptAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<&'a NetworkMetrics>,
}

fn render(analysis: &ScriptAnalysis, network: Option<&NetworkMetrics>) -> Result<String> {
    let report = Report {
        generated_at: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        analysis,
        network,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// The full analysis as pretty JSON, stamped with the generation time
pub fn to_json(analysis: &ScriptAnalysis) -> Result<String> {
    render(analysis, None)
}

pub fn to_json_with_metrics(analysis: &ScriptAnalysis, network: &NetworkMetrics) -> Result<String> {
    render(analysis, Some(network))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> CharacterRegistry {
        let mut registry = CharacterRegistry::new();
        for name in ["FRODO", "SAM", "GOLLUM", "ROSIE"] {
            registry.register(name);
        }
        let scenes: [&[&str]; 3] = [&["FRODO", "SAM"], &["SAM", "FRODO", "GOLLUM"], &["SAM", "ROSIE"]];
        for (index, speakers) in scenes.iter().enumerate() {
            let speakers: Vec<String> = speakers.iter().map(|s| s.to_string()).collect();
            registry.record_scene(&speakers, index);
        }
        registry.record_mention("FRODO", "SAM");
        registry.record_mention("FRODO", "GOLLUM");
        registry
    }

    fn everyone() -> ExportConfig {
        ExportConfig {
            min_scene_appearances: 0,
            ..ExportConfig::default()
        }
    }

    #[test]
    fn test_character_rows_filtered_by_appearances() {
        let registry = setup();
        let rows = character_rows(&registry, &ExportConfig::default());
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["FRODO", "SAM"]);
        assert_eq!(rows[1].scenes, "0 1 2");
        assert_eq!(rows[1].scene_count, 3);

        assert_eq!(character_rows(&registry, &everyone()).len(), 4);
    }

    #[test]
    fn test_interaction_pairs_once() {
        let registry = setup();
        let rows = interaction_rows(&registry, &everyone());
        assert_eq!(rows.len(), 4);
        assert!(rows.contains(&InteractionRow {
            source: "FRODO".to_string(),
            target: "SAM".to_string(),
            count: 2,
            title: None,
        }));
        assert!(!rows.iter().any(|r| r.source == "SAM" && r.target == "FRODO"));

        // GOLLUM and ROSIE appear once, so only FRODO-SAM survives the default filter
        let filtered = interaction_rows(&registry, &ExportConfig::default());
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_mention_rows() {
        let registry = setup();
        assert_eq!(mention_rows(&registry, &everyone()).len(), 2);

        let filtered = mention_rows(&registry, &ExportConfig::default());
        assert_eq!(
            filtered,
            vec![MentionRow {
                speaker: "FRODO".to_string(),
                mentioned: "SAM".to_string(),
                count: 1,
                title: None,
            }]
        );
    }

    #[test]
    fn test_to_json_carries_timestamp_and_registry() {
        let analysis = ScriptAnalysis {
            registry: setup(),
            ..ScriptAnalysis::default()
        };
        let json = to_json(&analysis).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["generated_at"].is_string());
        assert_eq!(value["registry"][0]["display_name"], "FRODO");
        assert_eq!(value["registry"][0]["interaction_counts"]["SAM"], 2);
        assert!(value.get("network").is_none());
        assert!(value.get("title").is_none());
    }

    #[test]
    fn test_title_stamped_on_rows_and_report() {
        let config = ExportConfig {
            title: Some("The Fellowship of the Ring".to_string()),
            ..everyone()
        };
        let tables = ExportTables::build(&setup(), &config);
        assert!(tables.characters.iter().all(|r| r.title == config.title));
        assert!(tables.interactions.iter().all(|r| r.title == config.title));
        assert!(tables.mentions.iter().all(|r| r.title == config.title));

        let analysis = ScriptAnalysis {
            title: config.title.clone(),
            ..ScriptAnalysis::default()
        };
        let value: serde_json::Value = serde_json::from_str(&to_json(&analysis).unwrap()).unwrap();
        assert_eq!(value["title"], "The Fellowship of the Ring");
    }
}
