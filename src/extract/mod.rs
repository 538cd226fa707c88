// File: ./src/extract/mod.rs
//! Generic date extraction pipeline.
//!
//! text -> pattern matches -> parsed, scored dates -> event candidates.
pub mod matcher;
pub mod metadata;
pub mod parser;
pub mod patterns;

pub use matcher::{DateMatcher, TimeMatch};
pub use metadata::{EventMetadata, MetadataExtractor};
pub use parser::{DateParseError, parse_lenient, parse_time_of_day, score_confidence};
pub use patterns::{PatternSet, TimeKind};

use crate::config::Config;
use crate::model::{DateMatch, EventCandidate, ParsedDate, window};
use chrono::{Local, NaiveDateTime};
use log::debug;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct DateExtractor {
    matcher: DateMatcher,
    metadata: MetadataExtractor,
    time_window_chars: usize,
    preview_half_width: usize,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl DateExtractor {
    pub fn new(config: &Config) -> Self {
        Self::with_patterns(PatternSet::standard(), config)
    }

    pub fn with_patterns(patterns: PatternSet, config: &Config) -> Self {
        Self {
            matcher: DateMatcher::new(patterns),
            metadata: MetadataExtractor::new(
                &config.context_words,
                config.metadata_window_chars,
                config.sentence_fallback_chars,
                config.title_max_chars,
            ),
            time_window_chars: config.time_window_chars,
            preview_half_width: config.preview_half_width,
        }
    }

    pub fn matcher(&self) -> &DateMatcher {
        &self.matcher
    }

    /// Parses one raw match, merging in a nearby time of day.
    pub fn parse_match(
        &self,
        text: &str,
        m: &DateMatch,
        now: NaiveDateTime,
    ) -> Result<ParsedDate, DateParseError> {
        let date = parse_lenient(&m.raw_text, now.date())?;
        let mut timestamp = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DateParseError::OutOfRange(m.raw_text.clone()))?;

        if let Some(tm) = self
            .matcher
            .find_time_near(text, m.position, self.time_window_chars)
            && let Some(t) = parse_time_of_day(&tm.raw_text)
        {
            timestamp = date.and_time(t);
        }

        let timestamp = parser::repair_year(&m.raw_text, timestamp, now)?;
        Ok(ParsedDate {
            raw_text: m.raw_text.clone(),
            position: m.position,
            timestamp,
            confidence: score_confidence(&m.raw_text, timestamp, now),
        })
    }

    /// All dates in `text`, in first-found order, scored against the
    /// current local time.
    pub fn extract_dates(&self, text: &str) -> Vec<ParsedDate> {
        self.extract_dates_at(text, Local::now().naive_local())
    }

    /// Same as [`extract_dates`](Self::extract_dates) with an explicit
    /// "now", which makes the result fully deterministic.
    pub fn extract_dates_at(&self, text: &str, now: NaiveDateTime) -> Vec<ParsedDate> {
        let mut emitted = HashSet::new();
        let mut results = Vec::new();
        for m in self.matcher.find_dates(text) {
            if emitted.contains(&m.position) {
                continue;
            }
            match self.parse_match(text, &m, now) {
                Ok(parsed) => {
                    emitted.insert(m.position);
                    results.push(parsed);
                }
                Err(e) => debug!("Dropping {:?} match: {}", m.pattern_kind, e),
            }
        }
        results
    }

    pub fn extract_events(&self, text: &str) -> Vec<EventCandidate> {
        self.extract_events_at(text, Local::now().naive_local())
    }

    pub fn extract_events_at(&self, text: &str, now: NaiveDateTime) -> Vec<EventCandidate> {
        self.extract_dates_at(text, now)
            .into_iter()
            .enumerate()
            .map(|(id, parsed)| self.to_candidate(id, text, parsed))
            .collect()
    }

    fn to_candidate(&self, id: usize, text: &str, parsed: ParsedDate) -> EventCandidate {
        let meta = self.metadata.extract(text, parsed.position);
        let title = if meta.title.trim().is_empty() {
            format!("Event on {}", parsed.timestamp.format("%Y-%m-%d"))
        } else {
            meta.title
        };
        EventCandidate {
            id,
            formatted_date: parsed.timestamp.format("%Y-%m-%dT%H:%M").to_string(),
            preview_description: window(text, parsed.position, self.preview_half_width * 2)
                .to_string(),
            date_str: parsed.raw_text,
            timestamp: parsed.timestamp,
            confidence: parsed.confidence,
            title,
            full_description: meta.description,
        }
    }
}

/// Keeps candidates whose confidence is at least `min_confidence`.
/// Thresholding is caller policy; the pipeline itself never filters.
pub fn filter_by_confidence(
    candidates: impl IntoIterator<Item = EventCandidate>,
    min_confidence: f64,
) -> Vec<EventCandidate> {
    candidates
        .into_iter()
        .filter(|c| c.confidence >= min_confidence)
        .collect()
}
