// File: ./src/extract/metadata.rs
//! Title and description inference from the prose around a date.
use crate::model::{truncate_chars, window};
use log::debug;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

pub const DEFAULT_CONTEXT_WORDS: &[&str] = &[
    "meeting",
    "appointment",
    "schedule",
    "event",
    "conference",
    "session",
    "deadline",
    "due",
    "by",
    "until",
    "seminar",
    "workshop",
    "class",
    "lecture",
    "presentation",
    "call",
    "interview",
    "discussion",
];

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));
static CAPITALIZED_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][^.!?:]*(?:[:.]\s*|$)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
struct ContextWord {
    word: String,
    clause: Regex,
}

#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    context_words: Vec<ContextWord>,
    window_chars: usize,
    fallback_chars: usize,
    title_max_chars: usize,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WORDS.iter().copied(), 400, 100, 50)
    }
}

impl MetadataExtractor {
    pub fn new<I, S>(words: I, window_chars: usize, fallback_chars: usize, title_max_chars: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let context_words = words
            .into_iter()
            .filter_map(|w| {
                let word = w.as_ref().trim().to_lowercase();
                if word.is_empty() {
                    return None;
                }
                let src = format!(r"[^.!?]*\b{}\b[^.!?]*", regex::escape(&word));
                match RegexBuilder::new(&src).case_insensitive(true).build() {
                    Ok(clause) => Some(ContextWord { word, clause }),
                    Err(e) => {
                        debug!("Skipping context word '{}': {}", word, e);
                        None
                    }
                }
            })
            .collect();
        Self {
            context_words,
            window_chars,
            fallback_chars,
            title_max_chars,
        }
    }

    /// Derives `(title, description)` for the date starting at `position`.
    ///
    /// The description is the whole context window. The title comes from the
    /// first vocabulary word found in the date's sentence, else the longest
    /// capitalized phrase, else the sentence itself.
    pub fn extract(&self, text: &str, position: usize) -> EventMetadata {
        let context = window(text, position, self.window_chars);
        let sentence = self.sentence_at_middle(context);

        let title = self
            .title_from_context_words(sentence)
            .or_else(|| self.title_from_capitalized_phrase(sentence))
            .unwrap_or_else(|| truncate_chars(sentence, self.title_max_chars));

        EventMetadata {
            title,
            description: context.trim().to_string(),
        }
    }

    fn sentence_at_middle<'a>(&self, context: &'a str) -> &'a str {
        let mid = context.len() / 2;
        let mut start = 0;
        let mut spans = Vec::new();
        for brk in SENTENCE_BREAK.find_iter(context) {
            spans.push((start, brk.start()));
            start = brk.end();
        }
        spans.push((start, context.len()));

        let found = spans
            .into_iter()
            .find(|(s, e)| *s <= mid && mid <= *e)
            .map(|(s, e)| &context[s..e])
            .filter(|s| !s.is_empty());

        found.unwrap_or_else(|| window(context, mid, self.fallback_chars))
    }

    fn title_from_context_words(&self, sentence: &str) -> Option<String> {
        let lower = sentence.to_lowercase();
        self.context_words
            .iter()
            .filter(|cw| lower.contains(&cw.word))
            .find_map(|cw| cw.clause.find(sentence))
            .map(|m| truncate_chars(m.as_str().trim(), self.title_max_chars))
    }

    fn title_from_capitalized_phrase(&self, sentence: &str) -> Option<String> {
        let longest = CAPITALIZED_PHRASE
            .find_iter(sentence)
            .map(|m| m.as_str())
            .fold(None, |best: Option<&str>, p| match best {
                Some(b) if b.len() >= p.len() => Some(b),
                _ => Some(p),
            })?;
        let title = truncate_chars(longest.trim(), self.title_max_chars);
        (!title.is_empty()).then_some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_word_clause_is_title() {
        let text = "The meeting is scheduled for March 5, 2026 at 2:00 PM.";
        let meta = MetadataExtractor::default().extract(text, text.find("March").unwrap());
        assert_eq!(
            meta.title,
            "The meeting is scheduled for March 5, 2026 at 2:00..."
        );
        assert_eq!(meta.description, text);
    }

    #[test]
    fn test_word_boundary_needed_for_vocabulary() {
        // "nearby" contains "by" but is not the word "by".
        let text = "Nearby Lakes Cleanup on June 3";
        let meta = MetadataExtractor::default().extract(text, text.find("June").unwrap());
        assert_eq!(meta.title, "Nearby Lakes Cleanup on June 3");
    }

    #[test]
    fn test_capitalized_phrase_fallback() {
        let text = "see you then. Annual Gala Night: June 3 at the hall";
        let meta = MetadataExtractor::default().extract(text, text.find("June").unwrap());
        assert_eq!(meta.title, "Annual Gala Night:");
    }

    #[test]
    fn test_sentence_fallback_truncated() {
        let text = "on june 3 we all go somewhere nice and far away from the city lights";
        let meta = MetadataExtractor::new(Vec::<String>::new(), 400, 100, 20).extract(text, 3);
        assert_eq!(meta.title, "on june 3 we all go...");
    }

    #[test]
    fn test_custom_vocabulary() {
        let text = "Final rehearsal for the recital is on May 20.";
        let meta =
            MetadataExtractor::new(["recital"], 400, 100, 50).extract(text, text.find("May").unwrap());
        assert_eq!(meta.title, "Final rehearsal for the recital is on May 20");
    }
}
