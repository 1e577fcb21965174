//! Name Normalizer: raw cue text → display name
//!
//! Steps, in order:
//! 1. Truncate at the first `(` ("FRODO (V.O.)" → "FRODO ")
//! 2. Transliterate accented letters to plain text ("ÉOWYN" → "EOWYN")
//! 3. Remove configured punctuation
//! 4. Collapse whitespace runs and trim
//!
//! An empty result means "invalid, discard". Normalizing an already
//! normalized name returns it unchanged.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::NameConfig;

#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    strip_chars: Vec<char>,
    transliterate: bool,
}

impl NameNormalizer {
    pub fn new(config: &NameConfig) -> Self {
        Self {
            strip_chars: config.strip_chars.chars().collect(),
            transliterate: config.transliterate,
        }
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.finish(&self.prepare(raw))
    }

    /// Steps 1-2: the name before any punctuation is removed. Cue validity
    /// markers are checked against this form.
    pub fn prepare(&self, raw: &str) -> String {
        let head = truncate_annotation(raw);
        if self.transliterate {
            strip_diacritics(head)
        } else {
            head.to_string()
        }
    }

    /// Steps 3-4 on the output of `prepare`
    pub fn finish(&self, prepared: &str) -> String {
        if self.strip_chars.is_empty() {
            return collapse_whitespace(prepared);
        }
        let name: String = prepared.chars().filter(|c| !self.strip_chars.contains(c)).collect();
        collapse_whitespace(&name)
    }
}

/// Drop everything from the first `(` on (voice-over, continuation markers)
pub fn truncate_annotation(raw: &str) -> &str {
    match raw.find('(') {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain-text transliteration: decompose, drop combining marks, then map the
/// letters that have no decomposition.
pub fn strip_diacritics(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'Æ' => out.push_str("AE"),
            'æ' => out.push_str("ae"),
            'Œ' => out.push_str("OE"),
            'œ' => out.push_str("oe"),
            'Ø' => out.push('O'),
            'ø' => out.push('o'),
            'Đ' | 'Ð' => out.push('D'),
            'đ' | 'ð' => out.push('d'),
            'Þ' => out.push_str("TH"),
            'þ' => out.push_str("th"),
            'Ł' => out.push('L'),
            'ł' => out.push('l'),
            'ß' => out.push_str("ss"),
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{00A0}' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
