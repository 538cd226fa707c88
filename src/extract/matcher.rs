// File: ./src/extract/matcher.rs
use crate::extract::patterns::{PatternSet, TimeKind};
use crate::model::{DateMatch, window};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    pub raw_text: String,
    pub kind: TimeKind,
}

/// Scans text with an ordered pattern table.
///
/// Every pattern does its own pass over the document. Results are returned
/// in table order, then document order within a pattern; duplicates at the
/// same offset are left in place so the caller decides which one survives.
#[derive(Debug, Clone, Default)]
pub struct DateMatcher {
    patterns: PatternSet,
}

impl DateMatcher {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn find_dates(&self, text: &str) -> Vec<DateMatch> {
        let mut found = Vec::new();
        for (kind, re) in self.patterns.date_patterns() {
            for m in re.find_iter(text) {
                found.push(DateMatch {
                    raw_text: m.as_str().to_string(),
                    position: m.start(),
                    pattern_kind: *kind,
                });
            }
        }
        found
    }

    /// First time-of-day expression in `text`, by pattern priority.
    pub fn find_time(&self, text: &str) -> Option<TimeMatch> {
        self.patterns.time_patterns().iter().find_map(|(kind, re)| {
            re.find(text).map(|m| TimeMatch {
                raw_text: m.as_str().to_string(),
                kind: *kind,
            })
        })
    }

    /// Like [`find_time`](Self::find_time), restricted to a window around a
    /// date that was already found.
    pub fn find_time_near(&self, text: &str, position: usize, size: usize) -> Option<TimeMatch> {
        self.find_time(window(text, position, size))
    }
}
