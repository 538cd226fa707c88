// File: ./src/syllabus/general.rs
//! Assessment scan for syllabi without a signature entry.
//!
//! Finds the grading section by its heading (or a dated table when there is
//! no heading), then pairs assessment keywords with the date that follows
//! them on the same line.
use crate::extract::parser::{MIN_PLAUSIBLE_YEAR, parse_lenient};
use crate::model::StructuredAssessment;
use chrono::{Datelike, NaiveDate};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

const MIN_SECTION_LEN: usize = 100;

const SECTION_TITLES: &[&str] = &[
    r"Grade\s+Distribution",
    r"Assessments?",
    r"Grading",
    r"Evaluation",
    r"Course\s+Requirements",
    r"Assignments?",
    r"Marking\s+Scheme",
];

const DATE_ALT: &str = concat!(
    r"\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}",
    r"|\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}",
    r"|\b\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}",
);

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%m-%Y", "%Y-%m-%d", "%B %d, %Y",
    "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%B %d %Y", "%b %d %Y",
];

static SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    SECTION_TITLES
        .iter()
        .map(|t| Regex::new(&format!(r"(?ims)({t}.*?)(?:^[A-Z][^\n]+:|\z)")).expect("valid regex"))
        .collect()
});

static TABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)(?:Due\s+Date|Date|Deadline|Weight|Assessment).*?(?:\n.*?){{1,15}}(?:\d{{1,2}}[/\-.]\d{{1,2}}[/\-.]\d{{2,4}}|\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}})"
    ))
    .expect("valid regex")
});

static ASSESSMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)((?:Midterm|Quiz|Exam|Project|Assignment|Paper|Report|Presentation|Lab)[^\n]*?)({DATE_ALT})"
    ))
    .expect("valid regex")
});

static TRAILING_CONNECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[\s\-–:,(|]+|\s+(?:due|on|by|date)\b)+$").expect("valid regex")
});

/// The grading section of `text`, if one can be located.
pub fn find_assessment_section(text: &str) -> Option<&str> {
    for re in SECTION_PATTERNS.iter() {
        for c in re.captures_iter(text) {
            if let Some(section) = c.get(1)
                && section.as_str().len() > MIN_SECTION_LEN
            {
                return Some(section.as_str());
            }
        }
    }
    TABLE_PATTERN.find(text).map(|m| m.as_str())
}

/// Normalizes a matched date to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str, today: NaiveDate) -> Option<String> {
    let raw = raw.trim();
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .filter(|d| d.year() >= MIN_PLAUSIBLE_YEAR)
        .or_else(|| parse_lenient(raw, today).ok())?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn clean_title(raw: &str) -> Option<String> {
    let title = TRAILING_CONNECTIVE.replace(raw.trim(), "");
    let title = title.trim();
    (title.chars().count() > 3).then(|| title.to_string())
}

/// Keyword + date pairs found in `section`.
pub fn extract_general(section: &str, today: NaiveDate) -> Vec<StructuredAssessment> {
    ASSESSMENT_PATTERN
        .captures_iter(section)
        .filter_map(|c| {
            let date = normalize_date(&c[2], today);
            let title = clean_title(&c[1]);
            if date.is_none() || title.is_none() {
                debug!("Skipping general assessment match {:?}", &c[0]);
            }
            Some(StructuredAssessment::new(title?, date?, "during class"))
        })
        .collect()
}

/// Runs [`extract_general`] over the grading section, or the whole text
/// when no section is found.
pub fn extract_from_document(text: &str, today: NaiveDate) -> Vec<StructuredAssessment> {
    let section = find_assessment_section(text).unwrap_or(text);
    extract_general(section, today)
}
