//! Pandoc executable discovery and version gating.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ReaderError, Result};
use crate::settings::PandocSettings;

/// Oldest pandoc this reader supports. The metadata template relies on the
/// `$meta-json$` variable and `--citeproc`, both introduced in 2.11.
pub const MIN_PANDOC_VERSION: (u32, u32) = (2, 11);

/// Resolve the pandoc executable from the settings override or `PATH`.
pub fn resolve_executable(settings: &PandocSettings) -> Result<PathBuf> {
    let candidate = settings
        .pandoc_path
        .as_ref()
        .map_or_else(|| Path::new("pandoc").to_path_buf(), |p| p.clone());
    which::which(&candidate).map_err(|_| ReaderError::PandocMissing)
}

/// Resolve the executable and require a supported version.
pub fn ensure_available(settings: &PandocSettings) -> Result<PathBuf> {
    let program = resolve_executable(settings)?;
    let output = Command::new(&program)
        .arg("--version")
        .output()
        .map_err(|_| ReaderError::PandocMissing)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    check_version(&stdout)?;
    Ok(program)
}

/// Validate the `pandoc --version` banner against the supported floor.
fn check_version(version_output: &str) -> Result<()> {
    let banner = version_output.lines().next().unwrap_or_default();
    let Some((major, minor)) = parse_version(banner) else {
        return Err(ReaderError::UnsupportedPandocVersion {
            found: banner.to_string(),
        });
    };
    if (major, minor) < MIN_PANDOC_VERSION {
        return Err(ReaderError::UnsupportedPandocVersion {
            found: format!("{major}.{minor}"),
        });
    }
    Ok(())
}

/// Parse `major.minor` out of a banner like `pandoc 2.11.4` or `pandoc.exe 3.1`.
fn parse_version(banner: &str) -> Option<(u32, u32)> {
    let version = banner.split_whitespace().nth(1)?;
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    // A bare major like "3" counts as X.0
    let minor = parts.next().map_or(Some(0), |m| m.parse().ok())?;
    Some((major, minor))
}
