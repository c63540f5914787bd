//! Validation of ad-hoc Pandoc arguments and conversion intent detection.
//!
//! Two features need to be known before the command line is built: whether
//! citation processing was requested (bibliographies must then be attached)
//! and whether a table of contents was requested (the TOC fragment must then
//! be extracted from the output). Both can be expressed either through loose
//! CLI arguments or through defaults files; this module handles the loose
//! branch, [`crate::defaults`] the other.

use crate::defaults;
use crate::error::{ReaderError, Result};
use crate::settings::PandocSettings;

/// Arguments rejected outright: the reader controls standalone mode itself.
pub const UNSUPPORTED_ARGUMENTS: [&str; 2] = ["--standalone", "--self-contained"];

/// Accepted spellings of the citation-processing flag.
const CITEPROC_ARGUMENTS: [&str; 2] = ["--citeproc", "-C"];

/// Accepted spellings of the table-of-contents flag.
const TOC_ARGUMENTS: [&str; 2] = ["--toc", "--table-of-contents"];

/// What the validated options ask of the conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionIntent {
    /// Attach bibliographies and let Pandoc render citations.
    pub citations: bool,
    /// Extract the generated table of contents into metadata.
    pub table_of_contents: bool,
}

/// Validate the configured options and derive the conversion intent.
///
/// With no defaults files the loose `arguments`/`extensions` are checked;
/// otherwise the defaults files are loaded, merged and validated instead.
pub fn validate(settings: &PandocSettings) -> Result<ConversionIntent> {
    if settings.defaults_files.is_empty() {
        check_arguments(&settings.arguments)?;
        Ok(ConversionIntent {
            citations: citations_requested(&settings.arguments, &settings.joined_extensions()),
            table_of_contents: toc_requested(&settings.arguments),
        })
    } else {
        let merged = defaults::load_merged(&settings.defaults_files)?;
        defaults::validate(&merged)
    }
}

/// Reject any argument on the unsupported blocklist, naming the offender.
fn check_arguments(arguments: &[String]) -> Result<()> {
    for arg in arguments {
        if UNSUPPORTED_ARGUMENTS.contains(&arg.as_str()) {
            return Err(ReaderError::UnsupportedArgument(arg.clone()));
        }
    }
    Ok(())
}

/// Citations are on when a citeproc flag is given and the `citations`
/// extension has not been explicitly disabled.
fn citations_requested(arguments: &[String], extensions: &str) -> bool {
    let flagged = arguments
        .iter()
        .any(|arg| CITEPROC_ARGUMENTS.contains(&arg.as_str()));
    flagged && !extensions.contains("-citations")
}

fn toc_requested(arguments: &[String]) -> bool {
    arguments
        .iter()
        .any(|arg| TOC_ARGUMENTS.contains(&arg.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_args(args: &[&str]) -> PandocSettings {
        PandocSettings {
            arguments: args.iter().map(|s| (*s).to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_arguments_pass() {
        let settings = settings_with_args(&["--mathjax", "--wrap=none"]);
        let intent = validate(&settings).unwrap();
        assert!(!intent.citations);
        assert!(!intent.table_of_contents);
    }

    #[test]
    fn test_standalone_rejected() {
        let err = validate(&settings_with_args(&["--standalone"])).unwrap_err();
        assert_eq!(err.to_string(), "Argument --standalone is not supported.");
    }

    #[test]
    fn test_self_contained_rejected() {
        let err = validate(&settings_with_args(&["--mathjax", "--self-contained"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Argument --self-contained is not supported."
        );
    }

    #[test]
    fn test_citeproc_long_flag() {
        let intent = validate(&settings_with_args(&["--citeproc"])).unwrap();
        assert!(intent.citations);
    }

    #[test]
    fn test_citeproc_short_flag() {
        let intent = validate(&settings_with_args(&["-C"])).unwrap();
        assert!(intent.citations);
    }

    #[test]
    fn test_citations_disabled_by_extension() {
        let settings = PandocSettings {
            arguments: vec!["--citeproc".into()],
            extensions: vec!["+smart".into(), "-citations".into()],
            ..Default::default()
        };
        let intent = validate(&settings).unwrap();
        assert!(!intent.citations);
    }

    #[test]
    fn test_toc_both_spellings() {
        assert!(
            validate(&settings_with_args(&["--toc"]))
                .unwrap()
                .table_of_contents
        );
        assert!(
            validate(&settings_with_args(&["--table-of-contents"]))
                .unwrap()
                .table_of_contents
        );
    }
}
