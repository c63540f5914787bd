//! Pandoc defaults-file loading and validation.
//!
//! Defaults files are Pandoc's own YAML option bundles. Several may be
//! configured; they are merged key-by-key, and the same key appearing in
//! more than one file is an error (silent override would make the effective
//! configuration depend on file order).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{ReaderError, Result};
use crate::options::ConversionIntent;

/// Input format prefixes of the accepted Markdown family. Prefix matching
/// covers the dialect spellings: `markdown`, `markdown_mmd`,
/// `markdown_phpextra`, `markdown_strict`, `commonmark`, `commonmark_x`, `gfm`.
const MARKDOWN_FORMAT_PREFIXES: [&str; 3] = ["markdown", "commonmark", "gfm"];

/// Accepted output formats.
const HTML_OUTPUT_FORMATS: [&str; 2] = ["html", "html5"];

/// Defaults keys that must not be enabled.
const UNSUPPORTED_DEFAULTS: [&str; 2] = ["standalone", "self-contained"];

/// All defaults files merged into one mapping.
pub type MergedDefaults = BTreeMap<String, Value>;

/// Load every defaults file and merge them, failing on duplicate keys.
pub fn load_merged(paths: &[impl AsRef<Path>]) -> Result<MergedDefaults> {
    let mut merged = MergedDefaults::new();
    for path in paths {
        let path = path.as_ref();
        let mapping = load_one(path)?;
        for (key, value) in mapping {
            if merged.insert(key, value).is_some() {
                return Err(ReaderError::DuplicateDefaultsKey);
            }
        }
    }
    Ok(merged)
}

/// Parse a single defaults file into string-keyed entries.
fn load_one(path: &Path) -> Result<Vec<(String, Value)>> {
    let text =
        fs::read_to_string(path).map_err(|e| ReaderError::Io(path.to_path_buf(), e))?;
    let value: Value = serde_yaml::from_str(&text).map_err(|e| ReaderError::InvalidDefaults {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let Value::Mapping(mapping) = value else {
        return Err(ReaderError::InvalidDefaults {
            path: path.to_path_buf(),
            reason: "expected a YAML mapping".into(),
        });
    };
    mapping
        .into_iter()
        .map(|(key, value)| match key {
            Value::String(key) => Ok((key, value)),
            other => Err(ReaderError::InvalidDefaults {
                path: path.to_path_buf(),
                reason: format!("non-string key: {other:?}"),
            }),
        })
        .collect()
}

/// Validate the merged defaults and derive the conversion intent.
pub fn validate(merged: &MergedDefaults) -> Result<ConversionIntent> {
    check_unsupported(merged)?;
    let reader = check_input_format(merged)?;
    check_output_format(merged)?;

    let citations = (flag(merged, "citeproc") || has_citeproc_filter(merged))
        && !reader.contains("-citations");
    let table_of_contents = flag(merged, "table-of-contents") || flag(merged, "toc");

    Ok(ConversionIntent {
        citations,
        table_of_contents,
    })
}

fn check_unsupported(merged: &MergedDefaults) -> Result<()> {
    for name in UNSUPPORTED_DEFAULTS {
        if flag(merged, name) {
            return Err(ReaderError::UnsupportedDefaultSetting(name.to_string()));
        }
    }
    Ok(())
}

/// Determine the effective input format from exactly one of `reader`/`from`
/// and require a Markdown-family value.
fn check_input_format(merged: &MergedDefaults) -> Result<String> {
    let reader = string(merged, "reader");
    let from = string(merged, "from");

    let format = match (reader, from) {
        (None, None) => return Err(ReaderError::NoInputFormat),
        (Some(_), Some(_)) => return Err(ReaderError::AmbiguousInputFormat),
        (Some(format), None) | (None, Some(format)) => format,
    };

    // The dialect name runs up to the first +/- extension toggle
    let prefix = format
        .split(['+', '-'])
        .next()
        .unwrap_or_default();
    if MARKDOWN_FORMAT_PREFIXES
        .iter()
        .any(|family| prefix.starts_with(family))
    {
        Ok(format)
    } else {
        Err(ReaderError::InvalidInputFormat)
    }
}

/// Determine the effective output format from at most one of `writer`/`to`
/// and require an HTML value.
fn check_output_format(merged: &MergedDefaults) -> Result<()> {
    let writer = string(merged, "writer");
    let to = string(merged, "to");

    match (writer, to) {
        (Some(_), Some(_)) => Err(ReaderError::AmbiguousOutputFormat),
        (Some(format), None) | (None, Some(format))
            if HTML_OUTPUT_FORMATS.contains(&format.as_str()) =>
        {
            Ok(())
        }
        _ => Err(ReaderError::InvalidOutputFormat),
    }
}

/// A boolean defaults entry, absent or non-boolean counting as false.
fn flag(merged: &MergedDefaults, key: &str) -> bool {
    matches!(merged.get(key), Some(Value::Bool(true)))
}

/// A non-empty string defaults entry.
fn string(merged: &MergedDefaults, key: &str) -> Option<String> {
    match merged.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Whether the `filters` list names the citeproc filter.
fn has_citeproc_filter(merged: &MergedDefaults) -> bool {
    match merged.get("filters") {
        Some(Value::Sequence(filters)) => filters
            .iter()
            .any(|f| matches!(f, Value::String(name) if name == "citeproc")),
        _ => false,
    }
}
