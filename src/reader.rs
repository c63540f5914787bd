//! The reader pipeline: one source file in, HTML fragment + metadata out.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::{ReaderError, Result};
use crate::exec::Invocation;
use crate::metadata::{self, IdentityHook, MetadataHook};
use crate::settings::{FILE_EXTENSIONS, PandocSettings};
use crate::{bib, command, debug, frontmatter, options, output, pandoc};

/// Bundled pandoc template: metadata JSON preamble, then the wrapped body.
const METADATA_TEMPLATE: &str = include_str!("../templates/metadata.html5");

/// Result of converting one source file.
#[derive(Debug)]
pub struct ConversionResult {
    /// Bare HTML5 fragment.
    pub html: String,
    /// Flat metadata record. Includes `toc` when a table of contents was
    /// requested and `reading_time` when enabled.
    pub metadata: Map<String, Value>,
}

/// Converts Pandoc Markdown files to HTML5 fragments plus metadata.
///
/// The reader holds only immutable settings and the materialized template
/// file; `read` may be called for any number of files, from any thread.
pub struct PandocReader {
    settings: PandocSettings,
    template: NamedTempFile,
    hook: Box<dyn MetadataHook + Send + Sync>,
}

impl PandocReader {
    /// Validate the settings and materialize the bundled template.
    pub fn new(settings: PandocSettings) -> Result<Self> {
        settings.validate()?;
        let template = write_template()?;
        Ok(Self {
            settings,
            template,
            hook: Box::new(IdentityHook),
        })
    }

    /// Install a host metadata post-processing hook.
    pub fn with_hook(mut self, hook: Box<dyn MetadataHook + Send + Sync>) -> Self {
        self.hook = hook;
        self
    }

    /// Whether this reader is responsible for the given path.
    pub fn handles(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    /// Convert one source file.
    ///
    /// The pipeline is strictly linear: availability/version check, front
    /// matter validation, option validation, command construction,
    /// invocation, post-processing, metadata normalization. The first
    /// failure aborts the file; nothing is retried.
    pub fn read(&self, source_path: &Path) -> Result<ConversionResult> {
        let program = pandoc::ensure_available(&self.settings)?;

        let content = fs::read_to_string(source_path)
            .map_err(|e| ReaderError::Io(source_path.to_path_buf(), e))?;
        let body = frontmatter::validate(&content)?;

        let intent = options::validate(&self.settings)?;

        let mut cmd = command::document_command(&program, self.template.path(), &self.settings);
        if intent.citations {
            let bibs = bib::find_bibliographies(source_path, &self.settings.global_bib_names);
            debug!("read"; "{} bibliography file(s) for {}", bibs.len(), source_path.display());
            cmd.add_bibliographies(&bibs);
        }

        debug!("pandoc"; "{}", cmd.display());
        let stdout = Invocation::new(&cmd, &content)
            .timeout(self.settings.timeout())
            .run()?;

        let processed = output::process(&stdout, intent.table_of_contents)?;

        let raw_meta = self.resolve_formatted_fields(&program, processed.metadata)?;
        let mut meta = metadata::normalize(raw_meta, self.hook.as_ref());

        if intent.table_of_contents {
            // A document without headings yields an empty toc, not an error
            let toc = processed.toc.unwrap_or_default();
            metadata::store_field(&mut meta, "toc", Value::String(toc), self.hook.as_ref());
        }
        if self.settings.calculate_reading_time {
            let time = metadata::reading_time(body, &self.settings)?;
            metadata::store_field(
                &mut meta,
                "reading_time",
                Value::String(time),
                self.hook.as_ref(),
            );
        }

        Ok(ConversionResult {
            html: processed.html,
            metadata: meta,
        })
    }

    /// Run each declared formatted field back through pandoc so its value is
    /// HTML rather than raw Markdown.
    fn resolve_formatted_fields(
        &self,
        program: &Path,
        mut raw_meta: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        if self.settings.formatted_fields.is_empty() {
            return Ok(raw_meta);
        }

        let fragment_cmd = command::fragment_command(program, &self.settings);
        for field in &self.settings.formatted_fields {
            let Some(key) = raw_meta
                .keys()
                .find(|k| k.eq_ignore_ascii_case(field))
                .cloned()
            else {
                continue;
            };
            if let Some(Value::String(raw_value)) = raw_meta.get(&key).cloned() {
                let html = Invocation::new(&fragment_cmd, &raw_value)
                    .timeout(self.settings.timeout())
                    .run()?;
                raw_meta.insert(key, Value::String(metadata::clean_fragment(&html)));
            }
        }
        Ok(raw_meta)
    }
}

/// Write the embedded template to a temp file pandoc can be pointed at.
fn write_template() -> Result<NamedTempFile> {
    let mut template = tempfile::Builder::new()
        .prefix("pandoc_reader_")
        .suffix(".html5")
        .tempfile()
        .map_err(|e| ReaderError::Io("template".into(), e))?;
    template
        .write_all(METADATA_TEMPLATE.as_bytes())
        .map_err(|e| ReaderError::Io(template.path().to_path_buf(), e))?;
    Ok(template)
}


#[cfg(all(test, unix))]
mod pipeline_tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Stub pandoc: answers the version probe, emits canned document output
    /// for standalone calls, a canned fragment otherwise, and leaves an
    /// `invoked` marker for every conversion call.
    const STUB: &str = r##"#!/bin/sh
dir=$(dirname "$0")
case "$*" in
  *--version*)
    echo "pandoc 2.11.4"
    exit 0
    ;;
  *--standalone*)
    cat > /dev/null
    touch "$dir/invoked"
    printf '%s\n' '{"Title":"Hello","summary":"A *short* summary."}'
    printf '<body>\n<nav id="TOC" role="doc-toc"><ul><li><a href="#h">H</a></li></ul></nav>\n'
    printf '<h1 id="h">H</h1>\n<p>Body text with a <a href="%%7Bstatic%%7D/a.pdf">file</a>.</p>\n</body>\n'
    ;;
  *)
    cat > /dev/null
    touch "$dir/invoked"
    printf '<p>A <em>short</em> summary.</p>\n'
    ;;
esac
"##;

    fn stub_pandoc(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("pandoc");
        fs::write(&path, STUB).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn stub_with_version(dir: &TempDir, banner: &str) -> PathBuf {
        let path = dir.path().join("pandoc");
        fs::write(&path, format!("#!/bin/sh\necho \"{banner}\"\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn source_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("post.md");
        fs::write(&path, content).unwrap();
        path
    }

    const SOURCE: &str = "---\ntitle: Hello\nsummary: A *short* summary.\n---\n\n# H\n\nBody text here.\n";

    #[test]
    fn test_read_end_to_end() {
        let dir = TempDir::new().unwrap();
        let settings = PandocSettings {
            pandoc_path: Some(stub_pandoc(&dir)),
            arguments: vec!["--toc".into()],
            calculate_reading_time: true,
            ..Default::default()
        };
        let reader = PandocReader::new(settings).unwrap();
        let result = reader.read(&source_file(&dir, SOURCE)).unwrap();

        assert!(result.html.contains("<h1 id=\"h\">H</h1>"));
        assert!(!result.html.contains("<nav"));
        // Placeholder tokens restored after parsing
        assert!(result.html.contains("href=\"{static}/a.pdf\""));

        let toc = result.metadata.get("toc").unwrap().as_str().unwrap();
        assert!(toc.starts_with("<nav class=\"toc\""));

        assert_eq!(result.metadata.get("title").unwrap(), "Hello");
        assert_eq!(result.metadata.get("reading_time").unwrap(), "1 minute");
    }

    #[test]
    fn test_formatted_field_resolved() {
        let dir = TempDir::new().unwrap();
        let settings = PandocSettings {
            pandoc_path: Some(stub_pandoc(&dir)),
            formatted_fields: vec!["summary".into()],
            ..Default::default()
        };
        let reader = PandocReader::new(settings).unwrap();
        let result = reader.read(&source_file(&dir, SOURCE)).unwrap();

        assert_eq!(
            result.metadata.get("summary").unwrap(),
            "A <em>short</em> summary."
        );
    }

    #[test]
    fn test_frontmatter_failure_spawns_no_conversion() {
        let dir = TempDir::new().unwrap();
        let settings = PandocSettings {
            pandoc_path: Some(stub_pandoc(&dir)),
            ..Default::default()
        };
        let reader = PandocReader::new(settings).unwrap();
        let source = source_file(&dir, "no front matter here\n");

        let err = reader.read(&source).unwrap_err();
        assert!(matches!(err, ReaderError::MissingMetadataHeader));
        assert!(!dir.path().join("invoked").exists());
    }

    #[test]
    fn test_unsupported_argument_spawns_no_conversion() {
        let dir = TempDir::new().unwrap();
        let settings = PandocSettings {
            pandoc_path: Some(stub_pandoc(&dir)),
            arguments: vec!["--standalone".into()],
            ..Default::default()
        };
        let reader = PandocReader::new(settings).unwrap();
        let err = reader.read(&source_file(&dir, SOURCE)).unwrap_err();

        assert_eq!(err.to_string(), "Argument --standalone is not supported.");
        assert!(!dir.path().join("invoked").exists());
    }

    #[test]
    fn test_old_pandoc_rejected() {
        let dir = TempDir::new().unwrap();
        let settings = PandocSettings {
            pandoc_path: Some(stub_with_version(&dir, "pandoc 2.9.2")),
            ..Default::default()
        };
        let reader = PandocReader::new(settings).unwrap();
        let err = reader.read(&source_file(&dir, SOURCE)).unwrap_err();
        assert_eq!(err.to_string(), "Pandoc version must be 2.11 or higher.");
    }

    #[test]
    fn test_idempotent_conversion() {
        let dir = TempDir::new().unwrap();
        let settings = PandocSettings {
            pandoc_path: Some(stub_pandoc(&dir)),
            arguments: vec!["--toc".into()],
            ..Default::default()
        };
        let reader = PandocReader::new(settings).unwrap();
        let source = source_file(&dir, SOURCE);

        let first = reader.read(&source).unwrap();
        let second = reader.read(&source).unwrap();
        assert_eq!(first.html, second.html);
        assert_eq!(first.metadata, second.metadata);
    }
}
