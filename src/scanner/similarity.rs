//! Fuzzy Dedup Matcher
//!
//! Catches markup artifacts that split or misspell a name already in the
//! registry ("FRO DO" for "FRODO"). Similarity is the Ratcliff/Obershelp
//! ratio `2 * M / (|a| + |b|)`, where `M` counts characters in recursively
//! found longest common blocks.
//!
//! A textually identical repeat (ratio 1.0 without any repair) is NOT a fuzzy
//! duplicate: exact repeats belong to the substring-containment check that
//! runs after this one during extraction.

use crate::config::DedupConfig;

// =============================================================================
// Ratcliff/Obershelp
// =============================================================================

/// Longest common block in `a[alo..ahi]` / `b[blo..bhi]` as (i, j, size).
/// Ties resolve to the block that ends first in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                cur[col] = k;
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            } else {
                cur[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_size)
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        queue.push((alo, i, blo, j));
        queue.push((i + size, ahi, j + size, bhi));
    }

    total
}

fn directed_ratio(a: &[char], b: &[char]) -> f64 {
    let len = a.len() + b.len();
    if len == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / len as f64
}

/// Symmetric similarity in [0, 1].
///
/// Block tie-breaking can make the one-directional ratio differ by argument
/// order, so the larger of both directions is reported.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    directed_ratio(&a, &b).max(directed_ratio(&b, &a))
}

// =============================================================================
// Fuzzy Matcher
// =============================================================================

/// Best fuzzy hit for a candidate against the registry
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    /// Display name of the closest existing character
    pub existing: String,
    pub ratio: f64,
    /// True when the candidate was compacted (spaces removed) before comparing
    pub repaired: bool,
}

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    short_token_len: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

impl FuzzyMatcher {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            threshold: config.similarity_threshold,
            short_token_len: config.short_token_len,
        }
    }

    /// Case-folded form of the candidate used for comparison, plus whether
    /// it had to be compacted. Short first tokens ("FRO DO") are glued back.
    pub fn comparison_form(&self, candidate: &str) -> (String, bool) {
        let folded = candidate.to_lowercase();
        let first_len = folded
            .split_whitespace()
            .next()
            .map(|t| t.chars().count())
            .unwrap_or(0);

        if first_len <= self.short_token_len {
            let compact: String = folded.chars().filter(|c| !c.is_whitespace()).collect();
            let repaired = compact != folded;
            (compact, repaired)
        } else {
            (folded, false)
        }
    }

    /// Highest similarity between the candidate and the first token of any
    /// existing name
    pub fn best_match<'a, I>(&self, candidate: &str, existing: I) -> Option<FuzzyMatch>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (form, repaired) = self.comparison_form(candidate);
        let mut best: Option<FuzzyMatch> = None;

        for name in existing {
            let first = name.split(' ').next().unwrap_or("").to_lowercase();
            let ratio = similarity(&form, &first);
            if best.as_ref().map_or(true, |b| ratio > b.ratio) {
                best = Some(FuzzyMatch {
                    existing: name.to_string(),
                    ratio,
                    repaired,
                });
            }
        }

        best
    }

    /// Is the best hit a near-duplicate? Above threshold, and either below 1.0
    /// or reached only after compacting the candidate.
    pub fn is_duplicate_match(&self, hit: &FuzzyMatch) -> bool {
        hit.ratio > self.threshold && (hit.ratio < 1.0 || hit.repaired)
    }

    pub fn is_duplicate<'a, I>(&self, candidate: &str, existing: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.best_match(candidate, existing)
            .map_or(false, |hit| self.is_duplicate_match(&hit))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_similarity_known_values() {
        assert!(approx(similarity("frodo", "frodo"), 1.0));
        assert!(approx(similarity("", ""), 1.0));
        assert!(approx(similarity("abc", ""), 0.0));
        // 5 matching chars over 11 total
        assert!(approx(similarity("fro do", "frodo"), 10.0 / 11.0));
        assert!(approx(similarity("sam", "gandalf"), 2.0 / 10.0));
    }

    #[test]
    fn test_similarity_symmetric() {
        let pairs = [
            ("fro do", "frodo"),
            ("abcd", "bcda"),
            ("gandalf", "galadriel"),
            ("aragorn", "arwen"),
            ("tide", "diet"),
            ("boromir", "faramir"),
        ];
        for (a, b) in pairs {
            assert!(approx(similarity(a, b), similarity(b, a)), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_split_name_is_duplicate() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.is_duplicate("FRO DO", ["FRODO"]));
    }

    #[test]
    fn test_exact_repeat_is_not_fuzzy_duplicate() {
        let matcher = FuzzyMatcher::default();
        let hit = matcher.best_match("FRODO", ["FRODO"]).unwrap();
        assert!(approx(hit.ratio, 1.0));
        assert!(!hit.repaired);
        assert!(!matcher.is_duplicate_match(&hit));
    }

    #[test]
    fn test_compares_against_first_token() {
        let matcher = FuzzyMatcher::default();
        // "GANDALFF" vs "gandalf": 14 / 15
        assert!(matcher.is_duplicate("GANDALFF", ["GANDALF THE GREY"]));
    }

    #[test]
    fn test_distinct_names_kept() {
        let matcher = FuzzyMatcher::default();
        assert!(!matcher.is_duplicate("SAM", ["FRODO", "GANDALF"]));
        assert!(!matcher.is_duplicate("MERRY", ["PIPPIN"]));
    }

    #[test]
    fn test_comparison_form() {
        let matcher = FuzzyMatcher::default();
        assert_eq!(matcher.comparison_form("FRO DO"), ("frodo".to_string(), true));
        assert_eq!(matcher.comparison_form("SAM"), ("sam".to_string(), false));
        // "old" is a short first token, so the whole name is compacted
        assert_eq!(matcher.comparison_form("OLD BILBO"), ("oldbilbo".to_string(), true));
        assert_eq!(matcher.comparison_form("GANDALF THE GREY"), ("gandalf the grey".to_string(), false));
    }

    #[test]
    fn test_compacted_exact_hit_is_duplicate() {
        let matcher = FuzzyMatcher::default();
        // "OLD BILBO" compacts to "oldbilbo", equal to the existing first token
        let hit = matcher.best_match("OLD BILBO", ["OLDBILBO"]).unwrap();
        assert!(approx(hit.ratio, 1.0));
        assert!(hit.repaired);
        assert!(matcher.is_duplicate_match(&hit));
    }

    #[test]
    fn test_best_match_tracks_maximum() {
        let matcher = FuzzyMatcher::default();
        let hit = matcher.best_match("GIMLEE", ["LEGOLAS", "GIMLI", "GLOIN"]).unwrap();
        assert_eq!(hit.existing, "GIMLI");
    }

    #[test]
    fn test_empty_registry_has_no_match() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.best_match("FRODO", std::iter::empty()).is_none());
        assert!(!matcher.is_duplicate("FRODO", std::iter::empty()));
    }
}
