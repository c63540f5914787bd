//! Reader error types.
//!
//! Every validation failure carries a fixed, human-readable message so the
//! host generator can surface it verbatim, while callers that need to react
//! programmatically match on the variant instead of the text.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while reading a Pandoc Markdown source file.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The pandoc executable could not be resolved.
    #[error("Could not find Pandoc. Please install.")]
    PandocMissing,

    /// The resolved pandoc is older than the supported floor (2.11).
    #[error("Pandoc version must be 2.11 or higher.")]
    UnsupportedPandocVersion {
        /// Version string reported by `pandoc --version`.
        found: String,
    },

    /// Source file has no content at all.
    #[error("Could not find metadata. File is empty.")]
    EmptyFile,

    /// First line of the source is not the exact `---` marker.
    ///
    /// Leading whitespace before the marker is deliberately rejected.
    #[error("Could not find metadata header '---'.")]
    MissingMetadataHeader,

    /// No `---` or `...` line terminates the metadata block.
    #[error("Could not find end of metadata block.")]
    MissingMetadataTerminator,

    /// An argument from the blocklist was passed in `arguments`.
    #[error("Argument {0} is not supported.")]
    UnsupportedArgument(String),

    /// A blocked boolean setting is true in a defaults file.
    #[error("The default {0} should be set to false.")]
    UnsupportedDefaultSetting(String),

    /// Neither `reader` nor `from` is present in the merged defaults.
    #[error("No input format specified.")]
    NoInputFormat,

    /// Both `reader` and `from` are present in the merged defaults.
    #[error("Specifying both from and reader is not supported. Please specify just one.")]
    AmbiguousInputFormat,

    /// The effective input format is not a Markdown variant.
    #[error("Input type has to be a Markdown variant.")]
    InvalidInputFormat,

    /// Both `writer` and `to` are present in the merged defaults.
    #[error("Specifying both to and writer is not supported. Please specify just one.")]
    AmbiguousOutputFormat,

    /// The effective output format is neither `html` nor `html5`.
    #[error("Output format type must be either html or html5.")]
    InvalidOutputFormat,

    /// The same key is defined by more than one defaults file.
    #[error("Duplicate keys defined in multiple defaults files.")]
    DuplicateDefaultsKey,

    /// `reading_speed` is neither a number nor a numeric string.
    #[error("READING_SPEED setting must be a number.")]
    InvalidReadingSpeed,

    /// A defaults file could not be read or is not a YAML mapping.
    #[error("Invalid defaults file `{path}`: {reason}")]
    InvalidDefaults { path: PathBuf, reason: String },

    /// Pandoc exited with a non-zero status.
    #[error("Pandoc command `{command}` failed with {status}\n{stderr}")]
    PandocFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Pandoc ran past the configured timeout and was killed.
    #[error("Pandoc command `{command}` timed out after {seconds}s")]
    PandocTimeout { command: String, seconds: u64 },

    /// Pandoc stdout did not contain the metadata preamble + body split.
    #[error("Unexpected Pandoc output: {0}")]
    MalformedOutput(String),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
