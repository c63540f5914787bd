//! Pandoc command-line construction.
//!
//! Two shapes are built from the same settings:
//!
//! - the **document command**: standalone mode with the bundled template, so
//!   pandoc emits the metadata JSON preamble followed by the wrapped body;
//! - the **fragment command**: bare conversion used for formatted metadata
//!   fields (a summary is a one-paragraph document, not a full page).
//!
//! Construction is deterministic; validation has already happened by the
//! time a command is assembled.

use std::path::{Path, PathBuf};

use crate::settings::PandocSettings;

/// An assembled pandoc invocation: executable plus ordered argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandocCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PandocCommand {
    /// The full token list, for error messages and logging.
    pub fn display(&self) -> String {
        let mut tokens = vec![self.program.to_string_lossy().into_owned()];
        tokens.extend(self.args.iter().cloned());
        tokens.join(" ")
    }

    /// Append one `--bibliography=` token per discovered file, in order.
    pub fn add_bibliographies(&mut self, bibs: &[PathBuf]) {
        for bib in bibs {
            self.args
                .push(format!("--bibliography={}", bib.to_string_lossy()));
        }
    }
}

/// Build the document command: standalone, bundled template, then either
/// the ad-hoc from/to/arguments or the defaults files.
pub fn document_command(
    program: &Path,
    template: &Path,
    settings: &PandocSettings,
) -> PandocCommand {
    let mut args = vec![
        "--standalone".to_string(),
        format!("--template={}", template.to_string_lossy()),
    ];
    push_format_args(&mut args, settings);
    PandocCommand {
        program: program.to_path_buf(),
        args,
    }
}

/// Build the fragment command: no standalone mode, no template.
pub fn fragment_command(program: &Path, settings: &PandocSettings) -> PandocCommand {
    let mut args = Vec::new();
    push_format_args(&mut args, settings);
    PandocCommand {
        program: program.to_path_buf(),
        args,
    }
}

fn push_format_args(args: &mut Vec<String>, settings: &PandocSettings) {
    if settings.defaults_files.is_empty() {
        args.push(format!("--from=markdown{}", settings.joined_extensions()));
        args.push("--to=html5".to_string());
        args.extend(settings.arguments.iter().cloned());
    } else {
        for path in &settings.defaults_files {
            args.push(format!("--defaults={}", path.to_string_lossy()));
        }
    }
}
