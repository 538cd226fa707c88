// File: ./src/syllabus/recurrence.rs
//! Synthesized events for cadence language ("weekly readings",
//! "participation throughout the term").
use crate::model::StructuredAssessment;
use chrono::NaiveDate;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use rrule::RRuleSet;
use std::collections::HashSet;
use std::str::FromStr;

pub const PARTICIPATION_TITLE: &str = "Class Participation";

fn build(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .expect("valid regex")
        })
        .collect()
}

static WEEKLY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    build(&[
        r"(?:assignment|reading|quiz|discussion|report).*?(?:weekly|each week|following each week|due weekly)",
        r"(?:weekly|each week|following each week).*?(?:assignment|reading|quiz|discussion|report)",
        r"weekly.*?(?:assignment|deliverable|submission)",
    ])
});

static PARTICIPATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    build(&[
        r"(?:participation|attendance).*?(?:on-going|ongoing|weekly|throughout)",
        r"(?:on-going|ongoing|weekly|throughout).*?(?:participation|attendance)",
        r"participation.*?(?:\d{1,2}\s*%|\d{1,2}\s*percent)",
    ])
});

/// Label for the weekly events implied by `phrase`.
pub fn weekly_title(phrase: &str) -> &'static str {
    let lower = phrase.to_lowercase();
    [
        ("reading", "Weekly Reading"),
        ("quiz", "Weekly Quiz"),
        ("discussion", "Weekly Discussion"),
        ("report", "Weekly Report"),
    ]
    .iter()
    .find(|(kw, _)| lower.contains(kw))
    .map(|(_, title)| *title)
    .unwrap_or("Weekly Assignment")
}

fn date_span(events: &[StructuredAssessment]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = events
        .iter()
        .filter_map(|e| NaiveDate::parse_from_str(&e.date, "%Y-%m-%d").ok());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Every 7th day from `start` through `end` inclusive.
pub fn weekly_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let rule = format!(
        "DTSTART:{}\nRRULE:FREQ=WEEKLY;UNTIL={}\n",
        start.format("%Y%m%dT000000Z"),
        end.format("%Y%m%dT235959Z")
    );
    match RRuleSet::from_str(&rule) {
        Ok(set) => set.into_iter().map(|d| d.date_naive()).collect(),
        Err(e) => {
            warn!("Could not expand weekly rule {:?}: {}", rule, e);
            Vec::new()
        }
    }
}

/// Adds one weekly event on each 7th day of the existing date span that has
/// no event yet. No-op without cadence language or without dated events.
pub fn inject_weekly(text: &str, events: &mut Vec<StructuredAssessment>) {
    let Some(phrase) = WEEKLY_PATTERNS.iter().find_map(|re| re.find(text)) else {
        return;
    };
    let Some((start, end)) = date_span(events) else {
        debug!("Weekly cadence found but no dated events to span");
        return;
    };
    let title = weekly_title(phrase.as_str());
    let taken: HashSet<String> = events.iter().map(|e| e.date.clone()).collect();

    for day in weekly_dates(start, end) {
        let date = day.format("%Y-%m-%d").to_string();
        if !taken.contains(&date) {
            events.push(StructuredAssessment::new(title, date, "weekly"));
        }
    }
}

/// Adds a single participation event on the earliest known date.
pub fn inject_participation(text: &str, events: &mut Vec<StructuredAssessment>) {
    if !PARTICIPATION_PATTERNS.iter().any(|re| re.is_match(text)) {
        return;
    }
    if events.iter().any(|e| e.title == PARTICIPATION_TITLE) {
        return;
    }
    if let Some((start, _)) = date_span(events) {
        events.push(StructuredAssessment::new(
            PARTICIPATION_TITLE,
            start.format("%Y-%m-%d").to_string(),
            "throughout the course",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(date: &str) -> StructuredAssessment {
        StructuredAssessment::new("Midterm Exam", date, "during class")
    }

    #[test]
    fn test_weekly_dates_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let days = weekly_dates(start, end);
        assert_eq!(days.len(), 3);
        assert_eq!(days[2], end);
        assert_eq!(weekly_dates(start, start), vec![start]);
    }

    #[test]
    fn test_weekly_title_inference() {
        assert_eq!(weekly_title("Readings are due weekly"), "Weekly Reading");
        assert_eq!(weekly_title("each week a quiz"), "Weekly Quiz");
        assert_eq!(weekly_title("weekly submission"), "Weekly Assignment");
    }

    #[test]
    fn test_inject_weekly_skips_taken_days() {
        let mut events = vec![exam("2025-03-03"), exam("2025-03-17")];
        inject_weekly("A short reading is assigned each week.", &mut events);
        let added: Vec<_> = events.iter().filter(|e| e.time == "weekly").collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].date, "2025-03-10");
        assert_eq!(added[0].title, "Weekly Reading");
    }

    #[test]
    fn test_inject_weekly_needs_dates() {
        let mut events = Vec::new();
        inject_weekly("Weekly assignments", &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_single_participation_event() {
        let mut events = vec![exam("2025-04-01"), exam("2025-02-11")];
        let text = "Participation 15% of the final grade";
        inject_participation(text, &mut events);
        inject_participation(text, &mut events);
        let p: Vec<_> = events
            .iter()
            .filter(|e| e.title == PARTICIPATION_TITLE)
            .collect();
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].date, "2025-02-11");
    }
}
