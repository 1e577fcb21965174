//! Social network metrics over the interaction graph
//!
//! One node per character, one undirected edge per interacting pair weighted
//! by the number of shared scenes. Built once from a finished registry.

use std::collections::{BTreeMap, HashMap};

use rustworkx_core::petgraph::graph::{NodeIndex, UnGraph};
use rustworkx_core::petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::scanner::registry::CharacterRegistry;

/// Below this many nodes betweenness runs single-threaded
const PARALLEL_THRESHOLD: usize = 50;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Community {
    pub id: usize,
    /// Display names, in registry order
    pub members: Vec<String>,
    /// Internal edge density in [0, 1]
    pub cohesion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterMetrics {
    pub name: String,
    pub degree: usize,
    /// Sum of interaction weights
    pub strength: u32,
    pub degree_centrality: f64,
    pub betweenness: f64,
    pub community: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkMetrics {
    pub characters: Vec<CharacterMetrics>,
    pub communities: Vec<Community>,
    pub components: usize,
}

// =============================================================================
// CastGraph
// =============================================================================

#[derive(Debug, Clone)]
pub struct CastGraph {
    graph: UnGraph<String, u32>,
}

impl CastGraph {
    pub fn from_registry(registry: &CharacterRegistry) -> Self {
        let mut graph: UnGraph<String, u32> = UnGraph::new_undirected();
        let node_map: HashMap<&str, NodeIndex> = registry
            .iter()
            .map(|c| (c.display_name(), graph.add_node(c.display_name().to_string())))
            .collect();

        // both endpoints carry the count; keep one edge per unordered pair
        let mut pairs: BTreeMap<(NodeIndex, NodeIndex), u32> = BTreeMap::new();
        for character in registry.iter() {
            let Some(&a) = node_map.get(character.display_name()) else {
                continue;
            };
            for (other, &count) in character.interaction_counts() {
                let Some(&b) = node_map.get(other.as_str()) else {
                    continue;
                };
                if a == b || count == 0 {
                    continue;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                let weight = pairs.entry(key).or_insert(0);
                *weight = (*weight).max(count);
            }
        }
        for ((a, b), weight) in pairs {
            graph.add_edge(a, b, weight);
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Interaction weight between two characters, if they share an edge
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let a = self.index_of(a)?;
        let b = self.index_of(b)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.graph.node_indices().find(|&i| self.graph[i] == name)
    }

    /// degree / (n - 1); all zero for graphs of one node or fewer
    pub fn degree_centrality(&self) -> Vec<(String, f64)> {
        let n = self.graph.node_count();
        if n <= 1 {
            return self.graph.node_weights().map(|name| (name.clone(), 0.0)).collect();
        }
        let normalizer = (n - 1) as f64;

        self.graph
            .node_indices()
            .map(|idx| {
                let degree = self.graph.edges(idx).count();
                (self.graph[idx].clone(), degree as f64 / normalizer)
            })
            .collect()
    }

    /// Normalized betweenness, endpoints excluded
    pub fn betweenness_centrality(&self) -> Vec<(String, f64)> {
        use rustworkx_core::centrality::betweenness_centrality;

        let scores = betweenness_centrality(&self.graph, false, true, PARALLEL_THRESHOLD);
        self.graph
            .node_indices()
            .map(|idx| {
                let score = scores.get(idx.index()).copied().flatten().unwrap_or(0.0);
                (self.graph[idx].clone(), score)
            })
            .collect()
    }

    /// Number of disconnected groups of characters
    pub fn component_count(&self) -> usize {
        use rustworkx_core::connectivity::number_connected_components;

        if self.graph.node_count() == 0 {
            return 0;
        }
        number_connected_components(&self.graph)
    }

    /// Weighted label propagation.
    ///
    /// Nodes update in registry order; ties keep the current label, else the
    /// smallest one wins, so the result is reproducible. Communities come out
    /// largest first and are numbered in that order.
    pub fn detect_communities(&self, max_iterations: usize) -> Vec<Community> {
        let n = self.graph.node_count();
        if n == 0 {
            return vec![];
        }

        let mut labels: Vec<usize> = (0..n).collect();

        for _ in 0..max_iterations {
            let mut changed = false;

            for idx in self.graph.node_indices() {
                let mut label_weights: BTreeMap<usize, u64> = BTreeMap::new();
                for edge in self.graph.edges(idx) {
                    let neighbor = if edge.source() == idx { edge.target() } else { edge.source() };
                    *label_weights.entry(labels[neighbor.index()]).or_default() += u64::from(*edge.weight());
                }

                let Some(&best_weight) = label_weights.values().max() else {
                    continue;
                };
                let current = labels[idx.index()];
                if label_weights.get(&current) == Some(&best_weight) {
                    continue;
                }
                // BTreeMap order: first hit is the smallest label
                if let Some((&best, _)) = label_weights.iter().find(|(_, &w)| w == best_weight) {
                    labels[idx.index()] = best;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        let mut groups: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            groups.entry(labels[idx.index()]).or_default().push(idx);
        }

        let mut grouped: Vec<Vec<NodeIndex>> = groups.into_values().collect();
        grouped.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

        grouped
            .into_iter()
            .enumerate()
            .map(|(id, members)| Community {
                id,
                cohesion: self.cohesion(&members),
                members: members.iter().map(|&i| self.graph[i].clone()).collect(),
            })
            .collect()
    }

    fn cohesion(&self, members: &[NodeIndex]) -> f64 {
        let k = members.len();
        if k < 2 {
            return 0.0;
        }
        let internal = self
            .graph
            .edge_references()
            .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
            .count();
        internal as f64 / (k * (k - 1) / 2) as f64
    }

    /// Every per-character measure in one table
    pub fn metrics(&self, max_iterations: usize) -> NetworkMetrics {
        let degree = self.degree_centrality();
        let betweenness = self.betweenness_centrality();
        let communities = self.detect_communities(max_iterations);

        let membership: HashMap<&str, usize> = communities
            .iter()
            .flat_map(|c| c.members.iter().map(move |m| (m.as_str(), c.id)))
            .collect();

        let characters = self
            .graph
            .node_indices()
            .map(|idx| {
                let name = self.graph[idx].clone();
                let i = idx.index();
                CharacterMetrics {
                    degree: self.graph.edges(idx).count(),
                    strength: self.graph.edges(idx).map(|e| *e.weight()).sum(),
                    degree_centrality: degree[i].1,
                    betweenness: betweenness[i].1,
                    community: membership.get(name.as_str()).copied(),
                    name,
                }
            })
            .collect();

        NetworkMetrics {
            characters,
            components: self.component_count(),
            communities,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Register `names` and play `scenes` (each a speaker list) in order
    fn setup(names: &[&str], scenes: &[&[&str]]) -> CharacterRegistry {
        let mut registry = CharacterRegistry::new();
        for name in names {
            registry.register(name);
        }
        for (index, speakers) in scenes.iter().enumerate() {
            let speakers: Vec<String> = speakers.iter().map(|s| s.to_string()).collect();
            registry.record_scene(&speakers, index);
        }
        registry
    }

    fn score(scores: &[(String, f64)], name: &str) -> f64 {
        scores.iter().find(|(n, _)| n == name).map(|(_, s)| *s).unwrap()
    }

    #[test]
    fn test_one_edge_per_pair() {
        let registry = setup(
            &["FRODO", "SAM", "GOLLUM"],
            &[&["FRODO", "SAM"], &["SAM", "FRODO"], &["FRODO", "GOLLUM"]],
        );
        let graph = CastGraph::from_registry(&registry);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight("FRODO", "SAM"), Some(2));
        assert_eq!(graph.weight("SAM", "FRODO"), Some(2));
        assert_eq!(graph.weight("SAM", "GOLLUM"), None);
    }

    #[test]
    fn test_degree_centrality() {
        let registry = setup(
            &["FRODO", "SAM", "GOLLUM", "GANDALF"],
            &[&["FRODO", "SAM"], &["FRODO", "GOLLUM"], &["FRODO", "GANDALF"]],
        );
        let scores = CastGraph::from_registry(&registry).degree_centrality();

        assert!((score(&scores, "FRODO") - 1.0).abs() < 1e-9);
        assert!((score(&scores, "SAM") - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_on_path() {
        let registry = setup(&["SAM", "FRODO", "GOLLUM"], &[&["SAM", "FRODO"], &["FRODO", "GOLLUM"]]);
        let scores = CastGraph::from_registry(&registry).betweenness_centrality();

        assert!(score(&scores, "FRODO") > 0.0);
        assert_eq!(score(&scores, "SAM"), 0.0);
        assert_eq!(score(&scores, "GOLLUM"), 0.0);
    }

    #[test]
    fn test_two_communities() {
        let registry = setup(
            &["FRODO", "SAM", "GOLLUM", "ARAGORN", "LEGOLAS", "GIMLI"],
            &[
                &["FRODO", "SAM", "GOLLUM"],
                &["FRODO", "SAM", "GOLLUM"],
                &["FRODO", "SAM", "GOLLUM"],
                &["ARAGORN", "LEGOLAS", "GIMLI"],
                &["ARAGORN", "LEGOLAS", "GIMLI"],
                &["ARAGORN", "LEGOLAS", "GIMLI"],
                &["GOLLUM", "ARAGORN"],
            ],
        );
        let graph = CastGraph::from_registry(&registry);
        let communities = graph.detect_communities(20);

        assert_eq!(communities.len(), 2);
        assert_eq!(communities[0].members, vec!["FRODO", "SAM", "GOLLUM"]);
        assert_eq!(communities[1].members, vec!["ARAGORN", "LEGOLAS", "GIMLI"]);
        assert!((communities[0].cohesion - 1.0).abs() < 1e-9);
        assert_eq!(communities, graph.detect_communities(20));
    }

    #[test]
    fn test_isolated_characters() {
        let registry = setup(&["FRODO", "SAM", "TOM BOMBADIL"], &[&["FRODO", "SAM"]]);
        let graph = CastGraph::from_registry(&registry);

        assert_eq!(graph.component_count(), 2);
        let metrics = graph.metrics(10);
        let tom = metrics.characters.iter().find(|c| c.name == "TOM BOMBADIL").unwrap();
        assert_eq!(tom.degree, 0);
        assert_eq!(tom.degree_centrality, 0.0);
        assert_eq!(metrics.communities.len(), 2);
    }

    #[test]
    fn test_empty_graph() {
        let graph = CastGraph::from_registry(&CharacterRegistry::new());
        assert!(graph.is_empty());
        assert_eq!(graph.component_count(), 0);
        assert!(graph.detect_communities(10).is_empty());
        assert!(graph.metrics(10).characters.is_empty());
    }
}
