// File: ./src/ics.rs
// Writes finalized events as standalone .ics files.
use crate::config::Config;
use crate::context::AppContext;
use crate::extract::parse_time_of_day;
use crate::model::{CalendarEvent, StructuredAssessment};
use crate::storage::LocalStorage;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use icalendar::{Calendar, Component, Event, Property};
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Words of the title that make it into the filename.
const FILENAME_TITLE_WORDS: usize = 3;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("event has no start time")]
    MissingStartTime,
    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CalendarEmitter {
    output_dir: PathBuf,
    default_duration: Duration,
}

impl CalendarEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            default_duration: Duration::hours(1),
        }
    }

    pub fn from_config(config: &Config, ctx: &dyn AppContext) -> anyhow::Result<Self> {
        Ok(Self::new(config.resolve_output_dir(ctx)?).with_default_duration(config.event_duration()))
    }

    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// One VCALENDAR holding a single VEVENT with a fresh UID.
    pub fn render(&self, event: &CalendarEvent) -> Result<String, EmitError> {
        let start = event.start_time.ok_or(EmitError::MissingStartTime)?;
        let end = event
            .resolved_end(self.default_duration)
            .ok_or(EmitError::MissingStartTime)?;
        let title = event
            .resolved_title()
            .ok_or(EmitError::MissingStartTime)?;

        let mut vevent = Event::new();
        vevent.uid(&Uuid::new_v4().to_string());
        vevent.summary(&title);
        vevent.description(&event.description);
        if let Some(location) = event.location.as_deref().filter(|l| !l.trim().is_empty()) {
            vevent.add_property("LOCATION", location);
        }
        vevent.add_property("DTSTART", start.format("%Y%m%dT%H%M%S").to_string());
        vevent.add_property("DTEND", end.format("%Y%m%dT%H%M%S").to_string());
        vevent.timestamp(Utc::now());

        let mut calendar = Calendar::new();
        calendar.append_property(Property::new("METHOD", "PUBLISH"));
        calendar.push(vevent);
        Ok(calendar.to_string())
    }

    /// Writes `event` to a new file in the output directory and returns its
    /// path. Existing files are never overwritten; a numeric suffix is added
    /// instead (`name_1.ics`, `name_2.ics`, ...).
    pub fn emit(&self, event: &CalendarEvent) -> Result<PathBuf, EmitError> {
        let start = event.start_time.ok_or(EmitError::MissingStartTime)?;
        let contents = self.render(event)?;
        let stem = file_stem(start, event.resolved_title().as_deref().unwrap_or_default());

        fs::create_dir_all(&self.output_dir).map_err(|source| EmitError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut counter = 0usize;
        loop {
            let name = if counter == 0 {
                format!("{stem}.ics")
            } else {
                format!("{stem}_{counter}.ics")
            };
            let path = self.output_dir.join(name);
            match LocalStorage::write_new(&path, &contents) {
                Ok(()) => {
                    info!("Created calendar file {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
                Err(source) => return Err(EmitError::Io { path, source }),
            }
        }
    }

    /// Emits each event in order. Failures are logged and skipped.
    pub fn emit_all<'a>(&self, events: impl IntoIterator<Item = &'a CalendarEvent>) -> Vec<PathBuf> {
        events
            .into_iter()
            .filter_map(|event| match self.emit(event) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping event {:?}: {}", event.title, e);
                    None
                }
            })
            .collect()
    }
}

/// `YYYYMMDD_<first three title words>` with every non-alphanumeric
/// character replaced by `_`.
pub fn file_stem(start: NaiveDateTime, title: &str) -> String {
    let words = title
        .split_whitespace()
        .take(FILENAME_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join("_");
    let slug: String = words
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", start.format("%Y%m%d"), slug)
}

/// Calendar event for a structured assessment.
///
/// A label that reads as a clock time (`11:59pm`) sets the start time,
/// anything else (`during class`, `weekly`) starts at `default_time`. The
/// label is kept in the description. `None` when the date does not parse.
pub fn assessment_to_event(
    assessment: &StructuredAssessment,
    default_time: NaiveTime,
) -> Option<CalendarEvent> {
    let date = NaiveDate::parse_from_str(&assessment.date, "%Y-%m-%d").ok()?;
    let time = parse_time_of_day(&assessment.time).unwrap_or(default_time);
    Some(CalendarEvent {
        title: Some(assessment.title.clone()),
        description: format!("{} ({})", assessment.title, assessment.time),
        ..CalendarEvent::starting_at(date.and_time(time))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 27)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            file_stem(start(), "Midterm Quiz (in class) room 4"),
            "20250327_Midterm_Quiz__in"
        );
        assert_eq!(file_stem(start(), "Event on 2025-03-27"), "20250327_Event_on_2025_03_27");
    }

    #[test]
    fn test_render_requires_start() {
        let emitter = CalendarEmitter::new("unused");
        let err = emitter.render(&CalendarEvent::default()).unwrap_err();
        assert!(matches!(err, EmitError::MissingStartTime));
    }

    #[test]
    fn test_render_contains_event_fields() {
        let emitter = CalendarEmitter::new("unused");
        let mut event = CalendarEvent::starting_at(start());
        event.title = Some("Midterm Quiz".to_string());
        event.location = Some("Room 101".to_string());
        let ics = emitter.render(&event).unwrap();
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("SUMMARY:Midterm Quiz"));
        assert!(ics.contains("DTSTART:20250327T090000"));
        assert!(ics.contains("DTEND:20250327T100000"));
        assert!(ics.contains("LOCATION:Room 101"));
        assert!(ics.contains("UID:"));
        assert_eq!(ics.matches("CALSCALE").count(), 1);
        assert!(ics.contains("METHOD:PUBLISH"));
    }

    #[test]
    fn test_output_dir_override_keeps_duration() {
        let emitter = CalendarEmitter::new("configured")
            .with_default_duration(Duration::minutes(90))
            .with_output_dir("elsewhere");
        assert_eq!(emitter.output_dir(), Path::new("elsewhere"));
        let ics = emitter.render(&CalendarEvent::starting_at(start())).unwrap();
        assert!(ics.contains("DTEND:20250327T103000"));
    }

    #[test]
    fn test_assessment_time_labels() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let paper = StructuredAssessment::new("Reflection Paper", "2025-02-14", "11:59pm");
        let ev = assessment_to_event(&paper, nine).unwrap();
        assert_eq!(
            ev.start_time.unwrap().time(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
        assert!(ev.description.contains("11:59pm"));

        let quiz = StructuredAssessment::new("Quiz #1", "2025-03-12", "during class");
        let ev = assessment_to_event(&quiz, nine).unwrap();
        assert_eq!(ev.start_time.unwrap().time(), nine);

        let bad = StructuredAssessment::new("Quiz #1", "sometime", "during class");
        assert!(assessment_to_event(&bad, nine).is_none());
    }
}
