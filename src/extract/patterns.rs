// File: ./src/extract/patterns.rs
//! Ordered date and time-of-day pattern tables.
//!
//! Order matters: when two date patterns match at the same offset, the one
//! listed first wins. Time patterns are tried in order and the first one that
//! matches anywhere in the window is used.
use crate::model::PatternKind;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MONTHS: &str = "Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?";
pub const WEEKDAYS: &str = "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday";
const ORDINAL: &str = "(?:st|nd|rd|th)?";
const HOUR_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKind {
    TwelveHourMinutes,
    TwelveHour,
    TwentyFourHour,
    OClock,
    HalfPast,
    Quarter,
}

pub fn standard_date_specs() -> Vec<(PatternKind, String)> {
    vec![
        (
            PatternKind::NumericDate,
            r"\b\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\b".to_string(),
        ),
        (
            PatternKind::LongForm,
            format!(r"\b(?:{MONTHS})\s+\d{{1,2}}{ORDINAL},?\s+\d{{4}}\b"),
        ),
        (
            PatternKind::DayMonthYear,
            format!(r"\b\d{{1,2}}{ORDINAL}\s+(?:of\s+)?(?:{MONTHS}),?\s+\d{{4}}\b"),
        ),
        (
            PatternKind::IsoDate,
            r"\b\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}\b".to_string(),
        ),
        (
            PatternKind::WeekdayMonthDay,
            format!(r"\b(?:{WEEKDAYS}),?\s+(?:{MONTHS})\s+\d{{1,2}}{ORDINAL}\b"),
        ),
        (
            PatternKind::RelativeWeekday,
            format!(r"\b(?:this|next|last|coming|upcoming)\s+(?:{WEEKDAYS})\b"),
        ),
        (
            PatternKind::MonthYear,
            format!(r"\b(?:{MONTHS})\s+\d{{4}}\b"),
        ),
        (
            PatternKind::MonthDay,
            format!(r"\b(?:{MONTHS})\s+\d{{1,2}}{ORDINAL}\b"),
        ),
    ]
}

pub fn standard_time_specs() -> Vec<(TimeKind, String)> {
    let meridiem = r"(?:(?:AM|PM|am|pm)\b|a\.m\.|p\.m\.)";
    vec![
        (
            TimeKind::TwelveHourMinutes,
            format!(r"\b\d{{1,2}}:\d{{2}}\s*{meridiem}"),
        ),
        (TimeKind::TwelveHour, format!(r"\b\d{{1,2}}\s*{meridiem}")),
        (
            TimeKind::TwentyFourHour,
            r"\b\d{1,2}:\d{2}(?::\d{2})?\b".to_string(),
        ),
        (TimeKind::OClock, r"\b\d{1,2}\s+o['’]clock\b".to_string()),
        (
            TimeKind::HalfPast,
            format!(r"(?i)\bhalf\s+past\s+(?:\d{{1,2}}|{HOUR_WORDS})\b"),
        ),
        (
            TimeKind::Quarter,
            format!(r"(?i)\bquarter\s+(?:past|to)\s+(?:\d{{1,2}}|{HOUR_WORDS})\b"),
        ),
    ]
}

static STANDARD: Lazy<PatternSet> = Lazy::new(|| {
    PatternSet::new(standard_date_specs(), standard_time_specs())
        .expect("built-in date/time patterns must compile")
});

/// Compiled, immutable pattern tables. Cloning is cheap (regexes are
/// reference counted internally), so one set can be shared by many
/// extractors and threads.
#[derive(Debug, Clone)]
pub struct PatternSet {
    date_patterns: Vec<(PatternKind, Regex)>,
    time_patterns: Vec<(TimeKind, Regex)>,
}

impl PatternSet {
    pub fn new<D, T>(date_specs: D, time_specs: T) -> Result<Self, regex::Error>
    where
        D: IntoIterator<Item = (PatternKind, String)>,
        T: IntoIterator<Item = (TimeKind, String)>,
    {
        let date_patterns = date_specs
            .into_iter()
            .map(|(kind, src)| Regex::new(&src).map(|re| (kind, re)))
            .collect::<Result<Vec<_>, _>>()?;
        let time_patterns = time_specs
            .into_iter()
            .map(|(kind, src)| Regex::new(&src).map(|re| (kind, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            date_patterns,
            time_patterns,
        })
    }

    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn date_patterns(&self) -> &[(PatternKind, Regex)] {
        &self.date_patterns
    }

    pub fn time_patterns(&self) -> &[(TimeKind, Regex)] {
        &self.time_patterns
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::standard()
    }
}
