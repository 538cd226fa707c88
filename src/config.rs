// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::extract::metadata::DEFAULT_CONTEXT_WORDS;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_min_confidence() -> f64 {
    0.5
}
fn default_time_window() -> usize {
    200
}
fn default_metadata_window() -> usize {
    400
}
fn default_sentence_fallback() -> usize {
    100
}
fn default_title_max() -> usize {
    50
}
fn default_preview_half_width() -> usize {
    100
}

fn default_context_words() -> Vec<String> {
    DEFAULT_CONTEXT_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_event_duration() -> u32 {
    60
}
fn default_event_time() -> String {
    "09:00".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Where `.ics` files are written. Defaults to `<data dir>/calendar_events`.
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    #[serde(default = "default_time_window")]
    pub time_window_chars: usize,
    #[serde(default = "default_metadata_window")]
    pub metadata_window_chars: usize,
    #[serde(default = "default_sentence_fallback")]
    pub sentence_fallback_chars: usize,
    #[serde(default = "default_title_max")]
    pub title_max_chars: usize,
    #[serde(default = "default_preview_half_width")]
    pub preview_half_width: usize,
    #[serde(default = "default_context_words")]
    pub context_words: Vec<String>,

    #[serde(default = "default_event_duration")]
    pub default_event_duration_mins: u32,
    #[serde(default = "default_event_time")]
    pub default_event_time: String, // Format "HH:MM"

    /// Run the generic assessment scan on syllabi with no known course code.
    #[serde(default)]
    pub generic_fallback_for_unknown_family: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            min_confidence: 0.5,
            time_window_chars: 200,
            metadata_window_chars: 400,
            sentence_fallback_chars: 100,
            title_max_chars: 50,
            preview_half_width: 100,
            context_words: default_context_words(),
            default_event_duration_mins: 60,
            default_event_time: "09:00".to_string(),
            generic_fallback_for_unknown_family: false,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Loads the config, falling back to defaults only when the file does not exist.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(cfg) => Ok(cfg),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn resolve_output_dir(&self, ctx: &dyn AppContext) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
            _ => Ok(ctx.get_data_dir()?.join("calendar_events")),
        }
    }

    pub fn event_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.default_event_duration_mins))
    }

    /// Parsed `default_event_time`, 09:00 when the string is malformed.
    pub fn event_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(self.default_event_time.trim(), "%H:%M")
            .ok()
            .or_else(|| NaiveTime::from_hms_opt(9, 0, 0))
            .unwrap_or_default()
    }
}
