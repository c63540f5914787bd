//! Pandoc Markdown reader for static-site generators.
//!
//! Converts Pandoc-flavored Markdown files into HTML5 fragments plus a
//! normalized metadata record by shelling out to a system `pandoc`
//! executable. The pipeline per file: validate the YAML front matter
//! block, validate the configured options or defaults files, build the
//! pandoc command (discovering bibliography files when citations are on),
//! run pandoc with the source piped to stdin, then split the templated
//! output into metadata, an optional table of contents, and the body.

pub mod bib;
pub mod command;
pub mod defaults;
pub mod error;
pub mod exec;
pub mod frontmatter;
pub mod logger;
pub mod metadata;
pub mod options;
pub mod output;
pub mod pandoc;
pub mod reader;
pub mod settings;

pub use error::{ReaderError, Result};
pub use metadata::{IdentityHook, MetadataHook};
pub use reader::{ConversionResult, PandocReader};
pub use settings::{
    DEFAULT_GLOBAL_BIB_NAMES, DEFAULT_READING_SPEED, FILE_EXTENSIONS, PandocSettings,
};
