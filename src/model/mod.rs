// File: ./src/model/mod.rs
pub mod item;
pub mod window;

pub use item::{
    CalendarEvent, DateMatch, EventCandidate, ParsedDate, PatternKind, StructuredAssessment,
};
pub use window::{truncate_chars, window, window_bounds};
