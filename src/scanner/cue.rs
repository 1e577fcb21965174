//! Cue/body pair extraction
//!
//! A cue is the text inside a `<b>...</b>` tag; its body is everything after
//! the closing tag up to the next `<b>` (or the end of the input). Bold tokens
//! starting with an excluded prefix ("EXT.", "INT.", "SUPER") are headings:
//! they produce no pair and do not extend the previous body.

use regex::Regex;

use crate::config::CueConfig;
use crate::error::{Result, ScriptError};

const BOLD_OPEN: &str = "<b>";

/// One cue and the dialogue that follows it. Both borrow from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuePair<'a> {
    /// Raw cue text, indentation included
    pub cue: &'a str,
    pub body: &'a str,
    /// Byte offset of the opening `<b>`
    pub start: usize,
}

#[derive(Debug, Clone)]
pub struct CueExtractor {
    bold: Regex,
    excluded_prefixes: Vec<String>,
}

impl CueExtractor {
    pub fn new(config: &CueConfig) -> Result<Self> {
        let bold = Regex::new(r"(?s)<b>(.*?)</b>")
            .map_err(|e| ScriptError::Pattern(format!("Failed to build cue pattern: {}", e)))?;
        Ok(Self {
            bold,
            excluded_prefixes: config.excluded_prefixes.clone(),
        })
    }

    fn is_heading(&self, cue: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| cue.starts_with(p.as_str()))
    }

    /// All cue/body pairs in document order
    pub fn pairs<'a>(&self, text: &'a str) -> Vec<CuePair<'a>> {
        let mut pairs = Vec::new();
        let mut pos = 0;

        while let Some(caps) = self.bold.captures_at(text, pos) {
            let (Some(whole), Some(cue)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            if self.is_heading(cue.as_str()) {
                // skip just this `<b>` so a later cue is still found
                pos = whole.start() + BOLD_OPEN.len();
                continue;
            }

            let body_end = text[whole.end()..]
                .find(BOLD_OPEN)
                .map_or(text.len(), |offset| whole.end() + offset);

            pairs.push(CuePair {
                cue: cue.as_str(),
                body: &text[whole.end()..body_end],
                start: whole.start(),
            });

            if body_end >= text.len() {
                break;
            }
            pos = body_end;
        }

        pairs
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> CueExtractor {
        CueExtractor::new(&CueConfig::default()).unwrap()
    }

    #[test]
    fn test_pairs_in_order() {
        let text = "<b>   FRODO</b>Where are we?<b>   SAM</b>Lost, Mr. Frodo.";
        let pairs = extractor().pairs(text);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].cue, "   FRODO");
        assert_eq!(pairs[0].body, "Where are we?");
        assert_eq!(pairs[1].cue, "   SAM");
        assert_eq!(pairs[1].body, "Lost, Mr. Frodo.");
    }

    #[test]
    fn test_headings_excluded() {
        let text = "<b>EXT. SHIRE - DAY</b>Green hills.<b>   GANDALF</b>You're late.\
                    <b>INT. BAG END</b>Dark.<b>SUPER: 60 YEARS LATER</b><b>   BILBO</b>Hello.";
        let pairs = extractor().pairs(text);

        let cues: Vec<&str> = pairs.iter().map(|p| p.cue).collect();
        assert_eq!(cues, vec!["   GANDALF", "   BILBO"]);
        // the body stops at the heading, it does not swallow it
        assert_eq!(pairs[0].body, "You're late.");
        assert_eq!(pairs[1].body, "Hello.");
    }

    #[test]
    fn test_empty_and_unclosed() {
        assert!(extractor().pairs("").is_empty());
        assert!(extractor().pairs("no bold tags here").is_empty());
        assert!(extractor().pairs("<b>   FRODO without closing").is_empty());
    }

    #[test]
    fn test_offsets_point_at_tags() {
        let text = "intro <b>  A</b>x<b>  B</b>y";
        let pairs = extractor().pairs(text);
        assert_eq!(pairs[0].start, 6);
        assert_eq!(&text[pairs[1].start..pairs[1].start + 3], "<b>");
    }

    #[test]
    fn test_restartable() {
        let text = "<b>  A</b>one<b>EXT. X</b><b>  B</b>two";
        let ex = extractor();
        assert_eq!(ex.pairs(text), ex.pairs(text));
    }
}
