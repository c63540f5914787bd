//! Metadata normalization, host hook, and reading time.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::output::restore_link_tokens;
use crate::settings::PandocSettings;

/// Host seam for per-field metadata post-processing.
///
/// Static-site generators typically coerce fields by name (parse `date`
/// into a datetime, slugify `tags`, ...). The reader hands every normalized
/// value through this hook and stores whatever comes back.
pub trait MetadataHook {
    fn process_field(&self, key: &str, value: Value) -> Value;
}

/// Hook that stores values unchanged.
pub struct IdentityHook;

impl MetadataHook for IdentityHook {
    fn process_field(&self, _key: &str, value: Value) -> Value {
        value
    }
}

/// Normalize a raw metadata mapping: keys lowercased, string values trimmed
/// and stripped of one layer of surrounding double quotes, every value run
/// through the host hook.
pub fn normalize(
    raw: Map<String, Value>,
    hook: &dyn MetadataHook,
) -> Map<String, Value> {
    let mut metadata = Map::new();
    for (key, value) in raw {
        let key = key.to_lowercase();
        let value = hook.process_field(&key, clean_value(value));
        metadata.insert(key, value);
    }
    metadata
}

/// Normalize and store a single field (used for `toc`, `reading_time` and
/// formatted fields, which are produced outside the JSON preamble).
pub fn store_field(
    metadata: &mut Map<String, Value>,
    key: &str,
    value: Value,
    hook: &dyn MetadataHook,
) {
    let key = key.to_lowercase();
    let value = hook.process_field(&key, clean_value(value));
    metadata.insert(key, value);
}

fn clean_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(clean_string(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(clean_value).collect()),
        other => other,
    }
}

/// Trim whitespace and strip one layer of surrounding `"` characters.
fn clean_string(s: &str) -> String {
    let trimmed = s.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.to_string()
}

/// Strip the enclosing `<p>` a fragment conversion wraps a one-paragraph
/// value in, and restore link placeholder tokens.
pub fn clean_fragment(html: &str) -> String {
    let trimmed = html.trim();
    let unwrapped = trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(trimmed);
    restore_link_tokens(unwrapped.trim())
}

// ============================================================================
// Reading time
// ============================================================================

/// Estimate reading time for the body text, e.g. `"1 minute"` / `"3 minutes"`.
pub fn reading_time(body: &str, settings: &PandocSettings) -> Result<String> {
    let speed = settings.reading_speed()?;
    let words = count_words(body);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = (words as f64 / speed).ceil() as u64;
    Ok(format!("{minutes} minute{}", plural_s(minutes)))
}

/// Count words in Markdown text, ignoring markup.
///
/// Only text and code events count; link targets, HTML tags and formatting
/// characters do not inflate the figure.
pub fn count_words(markdown: &str) -> usize {
    use pulldown_cmark::{Event, Parser};

    Parser::new(markdown)
        .map(|event| match event {
            Event::Text(text) | Event::Code(text) => text.split_whitespace().count(),
            _ => 0,
        })
        .sum()
}

fn plural_s(n: u64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use serde_json::json;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_normalize_lowercases_keys() {
        let mut raw = Map::new();
        raw.insert("Title".into(), json!("Hello"));
        raw.insert("AUTHOR".into(), json!("Me"));
        let metadata = normalize(raw, &IdentityHook);
        assert_eq!(metadata.get("title").unwrap(), "Hello");
        assert_eq!(metadata.get("author").unwrap(), "Me");
    }

    #[test]
    fn test_normalize_strips_quotes_and_whitespace() {
        let mut raw = Map::new();
        raw.insert("title".into(), json!("  \"Quoted Title\"  "));
        let metadata = normalize(raw, &IdentityHook);
        assert_eq!(metadata.get("title").unwrap(), "Quoted Title");
    }

    #[test]
    fn test_only_one_quote_layer_stripped() {
        let mut raw = Map::new();
        raw.insert("title".into(), json!("\"\"double\"\""));
        let metadata = normalize(raw, &IdentityHook);
        assert_eq!(metadata.get("title").unwrap(), "\"double\"");
    }

    #[test]
    fn test_normalize_cleans_array_elements() {
        let mut raw = Map::new();
        raw.insert("tags".into(), json!([" rust ", "\"web\""]));
        let metadata = normalize(raw, &IdentityHook);
        assert_eq!(metadata.get("tags").unwrap(), &json!(["rust", "web"]));
    }

    #[test]
    fn test_hook_sees_lowercased_key() {
        struct UpperHook;
        impl MetadataHook for UpperHook {
            fn process_field(&self, key: &str, value: Value) -> Value {
                assert_eq!(key, key.to_lowercase());
                match value {
                    Value::String(s) => Value::String(s.to_uppercase()),
                    other => other,
                }
            }
        }
        let mut raw = Map::new();
        raw.insert("Title".into(), json!("hello"));
        let metadata = normalize(raw, &UpperHook);
        assert_eq!(metadata.get("title").unwrap(), "HELLO");
    }

    #[test]
    fn test_clean_fragment_unwraps_paragraph() {
        assert_eq!(
            clean_fragment("<p>A <em>short</em> summary.</p>\n"),
            "A <em>short</em> summary."
        );
        assert_eq!(clean_fragment("<div>not a paragraph</div>"), "<div>not a paragraph</div>");
    }

    #[test]
    fn test_count_words_ignores_markup() {
        assert_eq!(count_words("Hello **bold** world"), 3);
        assert_eq!(count_words("# A Heading\n\nBody text here."), 5);
        assert_eq!(count_words("[link text](https://example.com/very/long/url)"), 2);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_reading_time_exact_boundary() {
        let settings = PandocSettings::default();
        assert_eq!(reading_time(&words(200), &settings).unwrap(), "1 minute");
        assert_eq!(reading_time(&words(201), &settings).unwrap(), "2 minutes");
    }

    #[test]
    fn test_reading_time_custom_speed() {
        let settings = PandocSettings {
            reading_speed: Some(json!(100)),
            ..Default::default()
        };
        assert_eq!(reading_time(&words(150), &settings).unwrap(), "2 minutes");
    }

    #[test]
    fn test_reading_time_non_numeric_speed() {
        let settings = PandocSettings {
            reading_speed: Some(json!("fast")),
            ..Default::default()
        };
        assert!(matches!(
            reading_time("some text", &settings),
            Err(ReaderError::InvalidReadingSpeed)
        ));
    }

    #[test]
    fn test_reading_time_empty_body() {
        let settings = PandocSettings::default();
        assert_eq!(reading_time("", &settings).unwrap(), "0 minutes");
    }
}
