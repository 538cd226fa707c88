// File: ./src/syllabus/mod.rs
//! Structured assessment extraction for course syllabi.
//!
//! The course code in the document picks a family. Families with a
//! signature entry are matched against it; the others (and signature
//! families where nothing is confirmed) go through the generic scan. The
//! cadence passes run on top, then the list is deduplicated and sorted.
pub mod general;
pub mod recurrence;
pub mod signatures;

pub use signatures::{DocumentSignature, ExpectedAssessment, SignatureTable};

use crate::config::Config;
use crate::model::StructuredAssessment;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{AsRefStr, EnumIter, EnumString};

static COURSE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(ENTI|FNCE|OBHR|SGMA|MKTG|ACCT)\s*(\d{3})").expect("valid regex")
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseFamily {
    Enti,
    Fnce,
    Obhr,
    Sgma,
    Mktg,
    Acct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCode {
    pub family: CourseFamily,
    pub number: String,
}

impl std::fmt::Display for CourseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.family.as_ref(), self.number)
    }
}

/// First recognised course code in `text`.
pub fn detect_course(text: &str) -> Option<CourseCode> {
    let c = COURSE_CODE.captures(text)?;
    let family = c[1].parse::<CourseFamily>().ok()?;
    Some(CourseCode {
        family,
        number: c[2].to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct StructuredExtractor {
    table: SignatureTable,
    generic_fallback_for_unknown_family: bool,
}

impl Default for StructuredExtractor {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl StructuredExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            table: SignatureTable::default(),
            generic_fallback_for_unknown_family: config.generic_fallback_for_unknown_family,
        }
    }

    pub fn with_table(mut self, table: SignatureTable) -> Self {
        self.table = table;
        self
    }

    pub fn extract(&self, text: &str) -> Vec<StructuredAssessment> {
        self.extract_on(text, Local::now().date_naive())
    }

    /// `today` only fills in missing years in the generic scan.
    pub fn extract_on(&self, text: &str, today: NaiveDate) -> Vec<StructuredAssessment> {
        let mut events = match detect_course(text) {
            Some(code) => self.family_assessments(text, &code, today),
            None if self.generic_fallback_for_unknown_family => {
                general::extract_from_document(text, today)
            }
            None => {
                debug!("No course code found, skipping structured extraction");
                return Vec::new();
            }
        };

        recurrence::inject_weekly(text, &mut events);
        recurrence::inject_participation(text, &mut events);
        finalize(events)
    }

    fn family_assessments(
        &self,
        text: &str,
        code: &CourseCode,
        today: NaiveDate,
    ) -> Vec<StructuredAssessment> {
        if let Some(sig) = self.table.lookup(code.family, &code.number) {
            let confirmed = sig.match_document(text);
            info!(
                "{}: {} of {} expected assessments confirmed (table v{}, {})",
                code,
                confirmed.len(),
                sig.items.len(),
                self.table.version(),
                sig.term
            );
            if !confirmed.is_empty() {
                return confirmed;
            }
        }
        general::extract_from_document(text, today)
    }
}

/// Drops short titles, removes `(title, date)` duplicates keeping the first,
/// and sorts by date. The sort is stable, so same-day items keep their order.
pub fn finalize(events: Vec<StructuredAssessment>) -> Vec<StructuredAssessment> {
    let mut seen = HashSet::new();
    let mut out: Vec<StructuredAssessment> = events
        .into_iter()
        .filter(|e| e.title.trim().chars().count() > 3)
        .filter(|e| seen.insert((e.title.clone(), e.date.clone())))
        .collect();
    out.sort_by(|a, b| a.date.cmp(&b.date));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_course() {
        let code = detect_course("Syllabus for FNCE674 (Winter)").unwrap();
        assert_eq!(code.family, CourseFamily::Fnce);
        assert_eq!(code.to_string(), "FNCE 674");
        assert!(detect_course("HIST 101").is_none());

        let code = detect_course("SGMA 591B Strategic Management").unwrap();
        assert_eq!(code.family, CourseFamily::Sgma);
        assert_eq!(code.number, "591");
        assert_eq!(detect_course("ENTI 6745").unwrap().number, "674");
        assert!(detect_course("FNCE 67").is_none());
    }

    #[test]
    fn test_finalize_dedups_and_sorts() {
        let events = vec![
            StructuredAssessment::new("Final Exam", "2025-04-20", "during class"),
            StructuredAssessment::new("Lab", "2025-01-01", "during class"),
            StructuredAssessment::new("Midterm", "2025-02-01", "during class"),
            StructuredAssessment::new("Final Exam", "2025-04-20", "11:59pm"),
            StructuredAssessment::new("Final Exam", "2025-04-21", "during class"),
        ];
        let out = finalize(events.clone());
        let keys: Vec<_> = out
            .iter()
            .map(|e| (e.title.as_str(), e.date.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Midterm", "2025-02-01"),
                ("Final Exam", "2025-04-20"),
                ("Final Exam", "2025-04-21"),
            ]
        );
        assert_eq!(out[1].time, "during class");

        let reversed: Vec<_> = events.into_iter().rev().collect();
        let out = finalize(reversed);
        let finals: Vec<_> = out
            .iter()
            .filter(|e| e.title == "Final Exam" && e.date == "2025-04-20")
            .collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].time, "11:59pm");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_unknown_family_is_empty_by_default() {
        let text = "Midterm Exam: March 3, 2025. Final Paper: April 1, 2025.";
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(StructuredExtractor::default().extract_on(text, today).is_empty());

        let cfg = Config {
            generic_fallback_for_unknown_family: true,
            ..Config::default()
        };
        let found = StructuredExtractor::new(&cfg).extract_on(text, today);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_family_without_table_uses_general_scan() {
        let text = "MKTG 301 Marketing\nGrading\nProject proposal due 02/14/2025\n";
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let found = StructuredExtractor::default().extract_on(text, today);
        assert_eq!(
            found,
            vec![StructuredAssessment::new(
                "Project proposal",
                "2025-02-14",
                "during class"
            )]
        );
    }
}
