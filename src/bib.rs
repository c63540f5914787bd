//! Bibliography discovery.
//!
//! When citations are requested, sibling bibliography files are attached to
//! the pandoc invocation: for the source `posts/foo.md`, any `foo.json`,
//! `foo.yaml`, `foo.bibtex` or `foo.bib` in `posts/` or below, plus the
//! site-wide names configured in `global_bib_names`.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// Bibliography file extensions pandoc understands, in attachment order.
pub const BIB_EXTENSIONS: [&str; 4] = ["json", "yaml", "bibtex", "bib"];

/// Find bibliography files for `source_path`, walking its directory tree.
///
/// The result is deterministic for a fixed filesystem snapshot: directories
/// are visited in sorted order, and within each directory candidates are
/// checked name-by-name, extension-by-extension.
pub fn find_bibliographies(source_path: &Path, global_names: &[String]) -> Vec<PathBuf> {
    let mut names: Vec<String> = Vec::new();
    if let Some(stem) = source_path.file_stem() {
        names.push(stem.to_string_lossy().into_owned());
    }
    names.extend(global_names.iter().cloned());

    let root = source_path.parent().unwrap_or_else(|| Path::new("."));

    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path())
        .collect();
    dirs.sort();

    let mut bibs = Vec::new();
    for dir in dirs {
        for name in &names {
            for ext in BIB_EXTENSIONS {
                let candidate = dir.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    bibs.push(candidate);
                }
            }
        }
    }
    bibs
}
