//! Reader settings supplied by the host generator.
//!
//! The host's loose `{key: value}` settings table becomes an explicit struct
//! with named, typed, optional fields and documented defaults. Everything is
//! validated up front in [`PandocSettings::validate`] rather than read ad hoc
//! throughout the pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ReaderError, Result};

/// Words per minute assumed when no `reading_speed` is configured.
pub const DEFAULT_READING_SPEED: f64 = 200.0;

/// Site-wide bibliography base names searched next to every source file.
pub const DEFAULT_GLOBAL_BIB_NAMES: [&str; 3] = ["bibliography", "references", "refs"];

/// Source file extensions this reader takes responsibility for.
pub const FILE_EXTENSIONS: [&str; 4] = ["md", "markdown", "mkd", "mdown"];

/// Configuration for a [`PandocReader`](crate::PandocReader).
///
/// # Fields
///
/// | Field                    | Default                                  |
/// |--------------------------|------------------------------------------|
/// | `pandoc_path`            | `pandoc` found on `PATH`                 |
/// | `arguments`              | empty                                    |
/// | `extensions`             | empty                                    |
/// | `defaults_files`         | empty                                    |
/// | `global_bib_names`       | `bibliography`, `references`, `refs`     |
/// | `calculate_reading_time` | `false`                                  |
/// | `reading_speed`          | 200 words per minute                     |
/// | `formatted_fields`       | empty                                    |
/// | `timeout_secs`           | none (pandoc may block indefinitely)     |
///
/// `defaults_files` and `arguments`/`extensions` are alternative ways to
/// drive Pandoc: when any defaults file is given, the ad-hoc arguments and
/// extensions are ignored by the command builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PandocSettings {
    /// Explicit path to the pandoc executable. `None` means search `PATH`.
    pub pandoc_path: Option<PathBuf>,
    /// Extra pandoc CLI arguments, passed through verbatim and in order.
    pub arguments: Vec<String>,
    /// Markdown extension flags, e.g. `+smart` or `-citations`.
    pub extensions: Vec<String>,
    /// Pandoc defaults files, applied in order.
    pub defaults_files: Vec<PathBuf>,
    /// Base names of site-wide bibliography files.
    pub global_bib_names: Vec<String>,
    /// Whether to attach an estimated `reading_time` metadata field.
    pub calculate_reading_time: bool,
    /// Words-per-minute figure for the reading time estimate.
    ///
    /// Kept as a raw JSON value because hosts pass settings through untyped;
    /// a non-numeric value fails with `InvalidReadingSpeed` when used.
    pub reading_speed: Option<serde_json::Value>,
    /// Metadata keys whose raw values are themselves Pandoc Markdown and
    /// must be converted to HTML (e.g. `summary`).
    pub formatted_fields: Vec<String>,
    /// Kill the pandoc subprocess after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for PandocSettings {
    fn default() -> Self {
        Self {
            pandoc_path: None,
            arguments: Vec::new(),
            extensions: Vec::new(),
            defaults_files: Vec::new(),
            global_bib_names: DEFAULT_GLOBAL_BIB_NAMES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            calculate_reading_time: false,
            reading_speed: None,
            formatted_fields: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl PandocSettings {
    /// Markdown extensions joined into the `--from=markdown<ext>` suffix.
    pub fn joined_extensions(&self) -> String {
        self.extensions.concat()
    }

    /// Resolve the configured reading speed, failing on non-numeric values.
    pub fn reading_speed(&self) -> Result<f64> {
        let Some(value) = &self.reading_speed else {
            return Ok(DEFAULT_READING_SPEED);
        };
        let speed = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            // Hosts sometimes hand numbers through as strings
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match speed {
            Some(s) if s.is_finite() && s > 0.0 => Ok(s),
            _ => Err(ReaderError::InvalidReadingSpeed),
        }
    }

    /// Subprocess timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Boundary validation: catches misconfiguration before any file is read.
    pub fn validate(&self) -> Result<()> {
        // A bad reading speed only matters when reading time is requested
        if self.calculate_reading_time {
            self.reading_speed()?;
        }
        for path in &self.defaults_files {
            if !path.is_file() {
                return Err(ReaderError::InvalidDefaults {
                    path: path.clone(),
                    reason: "file not found".into(),
                });
            }
        }
        Ok(())
    }
}
