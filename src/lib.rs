// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod context;
pub mod document;
pub mod extract;
pub mod ics;
pub mod model;
pub mod storage;
pub mod syllabus;
