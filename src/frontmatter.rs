//! Front-matter block validation.
//!
//! The reader does not parse the YAML itself (Pandoc does that and hands the
//! metadata back as JSON); it only confirms the block is structurally there
//! so that a missing header fails fast, before any subprocess is spawned.
//!
//! The markers are matched exactly: trailing whitespace on the marker line
//! is tolerated, leading whitespace is not.

use crate::error::{ReaderError, Result};

/// Marker line opening a metadata block.
const BLOCK_START: &str = "---";

/// Marker lines closing a metadata block.
const BLOCK_END: [&str; 2] = ["---", "..."];

/// Validate the leading YAML metadata block and return the body text that
/// follows it (used for word counting).
///
/// Fails with [`ReaderError::EmptyFile`], [`ReaderError::MissingMetadataHeader`]
/// or [`ReaderError::MissingMetadataTerminator`].
pub fn validate(content: &str) -> Result<&str> {
    if content.is_empty() {
        return Err(ReaderError::EmptyFile);
    }

    let mut lines = content.split('\n');
    let first = lines.next().unwrap_or_default();
    if first.trim_end() != BLOCK_START {
        return Err(ReaderError::MissingMetadataHeader);
    }

    // Scan for the end marker, tracking the byte offset past each line
    let mut offset = first.len() + 1;
    for line in lines {
        let end = offset + line.len();
        if BLOCK_END.contains(&line.trim_end()) {
            // Body starts after the terminator line (and its newline, if any)
            let body_start = (end + 1).min(content.len());
            return Ok(&content[body_start..]);
        }
        offset = end + 1;
    }

    Err(ReaderError::MissingMetadataTerminator)
}
