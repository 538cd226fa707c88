// File: ./src/extract/parser.rs
//! Lenient date parsing, time-of-day parsing and confidence scoring.
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Years below this are treated as a parser placeholder and replaced.
pub const MIN_PLAUSIBLE_YEAR: i32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("no date could be recognised in '{0}'")]
    Unrecognized(String),
    #[error("date components out of range in '{0}'")]
    OutOfRange(String),
}

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)\b").expect("valid regex"));
static YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[/\-.](\d{1,2})[/\-.](\d{1,2})$").expect("valid regex"));
static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})$").expect("valid regex"));

static HAS_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}\b").expect("valid regex"));
static HAS_NUMERIC_DAY_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/\-.]\d{1,2}\b").expect("valid regex"));
static HAS_NAMED_DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2}\b")
        .expect("valid regex")
});
static HAS_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b")
        .expect("valid regex")
});

pub fn parse_month_name(s: &str) -> Option<u32> {
    let lower = s.to_lowercase();
    let full = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    full.iter().position(|m| {
        lower == *m || (lower.len() >= 3 && m.starts_with(lower.as_str()) && lower.len() <= m.len())
    })
    .map(|i| i as u32 + 1)
}

pub fn parse_weekday_name(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Two digit years land in the century that keeps them closest to `today`.
fn expand_year(y: i32, today: NaiveDate) -> i32 {
    if y >= 100 {
        return y;
    }
    let candidate = 2000 + y;
    if candidate > today.year() + 49 {
        candidate - 100
    } else {
        candidate
    }
}

fn ymd(raw: &str, y: i32, m: u32, d: u32) -> Result<NaiveDate, DateParseError> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| DateParseError::OutOfRange(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    OnOrAfter,
    After,
    Before,
}

fn resolve_weekday(today: NaiveDate, target: Weekday, relation: Relation) -> NaiveDate {
    let mut d = match relation {
        Relation::OnOrAfter => today,
        Relation::After => today + Duration::days(1),
        Relation::Before => today - Duration::days(1),
    };
    while d.weekday() != target {
        d = match relation {
            Relation::Before => d - Duration::days(1),
            _ => d + Duration::days(1),
        };
    }
    d
}

/// Parses a possibly partial date expression.
///
/// Accepts numeric forms (`YYYY-MM-DD`, `MM/DD/YYYY`, `DD/MM/YYYY`), month
/// names with or without day and year, ordinals, and weekday references
/// relative to `today`. A missing year becomes `today`'s year, a missing day
/// becomes the 1st. For ambiguous numeric dates month-first is tried before
/// day-first.
pub fn parse_lenient(raw: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();

    if let Some(c) = YMD.captures(trimmed) {
        let (y, m, d) = (
            c[1].parse::<i32>().unwrap_or_default(),
            c[2].parse::<u32>().unwrap_or_default(),
            c[3].parse::<u32>().unwrap_or_default(),
        );
        return ymd(raw, y, m, d);
    }

    if let Some(c) = NUMERIC.captures(trimmed) {
        let a = c[1].parse::<u32>().unwrap_or_default();
        let b = c[2].parse::<u32>().unwrap_or_default();
        let y = expand_year(c[3].parse::<i32>().unwrap_or_default(), today);
        return NaiveDate::from_ymd_opt(y, a, b)
            .or_else(|| NaiveDate::from_ymd_opt(y, b, a))
            .ok_or_else(|| DateParseError::OutOfRange(raw.to_string()));
    }

    let cleaned = ORDINAL_SUFFIX.replace_all(trimmed, "$1");
    let mut month = None;
    let mut weekday = None;
    let mut relation = Relation::OnOrAfter;
    let mut day = None;
    let mut year = None;

    for token in cleaned
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let token = token.trim_end_matches('.');
        if let Ok(n) = token.parse::<u32>() {
            if token.len() == 4 {
                year.get_or_insert(n as i32);
            } else if token.len() <= 2 {
                day.get_or_insert(n);
            }
            continue;
        }
        match token.to_lowercase().as_str() {
            "next" => relation = Relation::After,
            "last" => relation = Relation::Before,
            "this" | "coming" | "upcoming" | "of" | "on" | "the" => {}
            _ => {
                if month.is_none()
                    && let Some(m) = parse_month_name(token)
                {
                    month = Some(m);
                } else if weekday.is_none()
                    && let Some(w) = parse_weekday_name(token)
                {
                    weekday = Some(w);
                }
            }
        }
    }

    if let Some(m) = month {
        let y = year.unwrap_or_else(|| today.year());
        return ymd(raw, y, m, day.unwrap_or(1));
    }
    if let Some(w) = weekday {
        return Ok(resolve_weekday(today, w, relation));
    }
    Err(DateParseError::Unrecognized(raw.to_string()))
}

fn hour_word(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let words = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
        "twelve",
    ];
    words
        .iter()
        .position(|w| s.eq_ignore_ascii_case(w))
        .map(|i| i as u32 + 1)
}

/// Parses clock times: `2pm`, `2:30 PM`, `9 a.m.`, `13:05`, `13:05:30`,
/// `3 o'clock`, `half past two`, `quarter to 5`.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let lower = s.trim().to_lowercase().replace('.', "");
    let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();

    let parse_12h = |s: &str, is_pm: bool| -> Option<NaiveTime> {
        let (h, m) = if let Some((h_str, m_str)) = s.split_once(':') {
            (h_str.parse::<u32>().ok()?, m_str.parse::<u32>().ok()?)
        } else {
            (s.parse::<u32>().ok()?, 0)
        };
        if !(1..=12).contains(&h) || m > 59 {
            return None;
        }
        let h_24 = if h == 12 {
            if is_pm { 12 } else { 0 }
        } else if is_pm {
            h + 12
        } else {
            h
        };
        NaiveTime::from_hms_opt(h_24, m, 0)
    };

    if let Some(stripped) = compact.strip_suffix("am") {
        return parse_12h(stripped, false);
    }
    if let Some(stripped) = compact.strip_suffix("pm") {
        return parse_12h(stripped, true);
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    match words.as_slice() {
        [h, oclock] if oclock.ends_with("clock") => {
            let h = hour_word(h)?;
            return NaiveTime::from_hms_opt(h, 0, 0);
        }
        ["half", "past", h] => {
            let h = hour_word(h)?;
            return NaiveTime::from_hms_opt(h, 30, 0);
        }
        ["quarter", "past", h] => {
            let h = hour_word(h)?;
            return NaiveTime::from_hms_opt(h, 15, 0);
        }
        ["quarter", "to", h] => {
            let h = hour_word(h)?;
            if !(1..=24).contains(&h) {
                return None;
            }
            let prev = if h == 1 { 12 } else { h - 1 };
            return NaiveTime::from_hms_opt(prev, 45, 0);
        }
        _ => {}
    }

    let mut parts = compact.split(':');
    let h = parts.next()?.parse::<u32>().ok()?;
    let m = parts.next()?.parse::<u32>().ok()?;
    let sec = match parts.next() {
        Some(v) => v.parse::<u32>().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveTime::from_hms_opt(h, m, sec)
}

/// Replaces placeholder years with the year of `now`.
pub fn repair_year(
    raw: &str,
    ts: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, DateParseError> {
    if ts.year() >= MIN_PLAUSIBLE_YEAR {
        return Ok(ts);
    }
    ts.with_year(now.year())
        .ok_or_else(|| DateParseError::OutOfRange(raw.to_string()))
}

/// Heuristic likelihood that `raw` was a genuine, well formed date.
///
/// Always within `[0.1, 0.95]`. Computed in hundredths so that the usual
/// thresholds (0.6, 0.8, ...) compare exactly.
pub fn score_confidence(raw: &str, ts: NaiveDateTime, now: NaiveDateTime) -> f64 {
    let mut score: i64 = 50;
    if ts > now {
        score += 10;
    }
    if ts > now + Duration::days(365) {
        score -= 20;
    }
    if HAS_YEAR.is_match(raw) {
        score += 10;
    }
    if HAS_NUMERIC_DAY_MONTH.is_match(raw) || HAS_NAMED_DAY_MONTH.is_match(raw) {
        score += 10;
    }
    if HAS_WEEKDAY.is_match(raw) {
        score += 10;
    }
    score.clamp(10, 95) as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(y: i32, m: u32, day: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_numeric_forms() {
        assert_eq!(parse_lenient("2026-03-05", today()), Ok(d(2026, 3, 5)));
        assert_eq!(parse_lenient("03/05/2026", today()), Ok(d(2026, 3, 5)));
        // Month-first fails, so day-first is used.
        assert_eq!(parse_lenient("25/12/2025", today()), Ok(d(2025, 12, 25)));
        assert_eq!(parse_lenient("1.2.26", today()), Ok(d(2026, 1, 2)));
        assert!(matches!(
            parse_lenient("31/31/2025", today()),
            Err(DateParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_named_forms() {
        assert_eq!(parse_lenient("March 5, 2026", today()), Ok(d(2026, 3, 5)));
        assert_eq!(parse_lenient("5th of March, 2026", today()), Ok(d(2026, 3, 5)));
        assert_eq!(parse_lenient("Sept 2026", today()), Ok(d(2026, 9, 1)));
        assert_eq!(parse_lenient("Jan 9th", today()), Ok(d(2025, 1, 9)));
        assert_eq!(parse_lenient("Friday, June 13", today()), Ok(d(2025, 6, 13)));
        assert!(matches!(
            parse_lenient("February 30", today()),
            Err(DateParseError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_lenient("soonish", today()),
            Err(DateParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_parse_relative_weekdays() {
        assert_eq!(parse_lenient("next Friday", today()), Ok(d(2025, 6, 6)));
        assert_eq!(parse_lenient("this Wednesday", today()), Ok(d(2025, 6, 4)));
        assert_eq!(parse_lenient("next Wednesday", today()), Ok(d(2025, 6, 11)));
        assert_eq!(parse_lenient("last Monday", today()), Ok(d(2025, 6, 2)));
    }

    #[test]
    fn test_parse_time_of_day() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0);
        assert_eq!(parse_time_of_day("2:00 PM"), t(14, 0));
        assert_eq!(parse_time_of_day("2pm"), t(14, 0));
        assert_eq!(parse_time_of_day("12 a.m."), t(0, 0));
        assert_eq!(parse_time_of_day("11:59pm"), t(23, 59));
        assert_eq!(parse_time_of_day("13:30"), t(13, 30));
        assert_eq!(
            parse_time_of_day("13:30:15"),
            NaiveTime::from_hms_opt(13, 30, 15)
        );
        assert_eq!(parse_time_of_day("3 o'clock"), t(3, 0));
        assert_eq!(parse_time_of_day("half past two"), t(2, 30));
        assert_eq!(parse_time_of_day("quarter to 5"), t(4, 45));
        assert_eq!(parse_time_of_day("quarter past 11"), t(11, 15));
        assert_eq!(parse_time_of_day("during class"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("13pm"), None);
    }

    #[test]
    fn test_repair_placeholder_year() {
        let now = dt(2026, 1, 10);
        assert_eq!(repair_year("x", dt(1999, 4, 1), now), Ok(dt(2026, 4, 1)));
        assert_eq!(repair_year("x", dt(2024, 4, 1), now), Ok(dt(2024, 4, 1)));
        assert!(repair_year("x", dt(1996, 2, 29), dt(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_confidence_rules() {
        let now = dt(2025, 6, 1);
        // Future, has year, has day and month.
        assert_eq!(score_confidence("March 5, 2026", dt(2026, 3, 5), now), 0.8);
        // Past, month and day only.
        assert_eq!(score_confidence("March 5", dt(2025, 3, 5), now), 0.6);
        // Weekday adds, far future subtracts.
        assert_eq!(
            score_confidence("Friday, March 5, 2027", dt(2027, 3, 5), now),
            0.7
        );
        assert_eq!(score_confidence("next Friday", dt(2025, 6, 6), now), 0.7);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let now = dt(2025, 6, 1);
        for (raw, ts) in [
            ("whatever", dt(2075, 1, 1)),
            ("Monday 12/12/2099 Tuesday", dt(2099, 12, 12)),
            ("Friday, 3/4 2025", dt(2025, 6, 2)),
        ] {
            let c = score_confidence(raw, ts, now);
            assert!((0.1..=0.95).contains(&c), "{} scored {}", raw, c);
        }
        assert_eq!(score_confidence("Friday, 3/4 2025", dt(2025, 6, 2), now), 0.9);
    }
}
