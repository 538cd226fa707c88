// File: ./src/model/item.rs
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// Which entry of the date pattern table produced a match.
///
/// Variants are listed in table priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum PatternKind {
    NumericDate,
    LongForm,
    DayMonthYear,
    IsoDate,
    WeekdayMonthDay,
    RelativeWeekday,
    MonthYear,
    MonthDay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub raw_text: String,
    /// Byte offset of the match start within the document.
    pub position: usize,
    pub pattern_kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDate {
    pub raw_text: String,
    pub position: usize,
    pub timestamp: NaiveDateTime,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCandidate {
    pub id: usize,
    pub date_str: String,
    pub timestamp: NaiveDateTime,
    pub formatted_date: String,
    pub confidence: f64,
    pub title: String,
    pub full_description: String,
    pub preview_description: String,
}

impl EventCandidate {
    /// Turns the candidate into a finalized event using the default one hour slot.
    pub fn to_calendar_event(&self) -> CalendarEvent {
        CalendarEvent {
            start_time: Some(self.timestamp),
            end_time: None,
            title: Some(self.title.clone()),
            description: self.full_description.clone(),
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuredAssessment {
    pub title: String,
    /// Zero padded `YYYY-MM-DD`, so string order is chronological.
    pub date: String,
    pub time: String,
}

impl StructuredAssessment {
    pub fn new(title: impl Into<String>, date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            time: time.into(),
        }
    }
}

/// A finalized event, ready to be written as a calendar invitation.
///
/// `start_time` is optional only so that incomplete records coming from a
/// caller can be rejected by the emitter with a typed error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self {
            start_time: Some(start),
            ..Self::default()
        }
    }

    pub fn resolved_end(&self, default_duration: Duration) -> Option<NaiveDateTime> {
        let start = self.start_time?;
        Some(self.end_time.unwrap_or(start + default_duration))
    }

    pub fn resolved_title(&self) -> Option<String> {
        let start = self.start_time?;
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => Some(t.to_string()),
            _ => Some(format!("Event on {}", start.format("%Y-%m-%d"))),
        }
    }
}
