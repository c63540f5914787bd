//! pandoc-read - Convert a Pandoc Markdown file to HTML plus metadata.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};
use pandoc_reader::{PandocReader, PandocSettings, logger};

/// Pandoc Markdown reader CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Source files to convert
    #[arg(value_name = "FILES", required = true, value_hint = clap::ValueHint::FilePath)]
    files: Vec<PathBuf>,

    /// Path to the pandoc executable (default: search PATH)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pandoc: Option<PathBuf>,

    /// Extra pandoc argument, repeatable (e.g. --arg=--toc)
    #[arg(long = "arg", value_name = "ARG")]
    args: Vec<String>,

    /// Markdown extension flag, repeatable (e.g. --extension=+smart)
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Pandoc defaults file, repeatable and applied in order
    #[arg(long = "defaults", value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    defaults_files: Vec<PathBuf>,

    /// Attach an estimated reading_time metadata field
    #[arg(long)]
    reading_time: bool,

    /// Words per minute for the reading time estimate
    #[arg(long, value_name = "WPM")]
    reading_speed: Option<f64>,

    /// Metadata key whose value is converted to HTML, repeatable
    #[arg(long = "formatted-field", value_name = "KEY")]
    formatted_fields: Vec<String>,

    /// Kill pandoc after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the metadata record as JSON instead of the HTML body
    #[arg(long)]
    metadata_only: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let settings = PandocSettings {
        pandoc_path: cli.pandoc,
        arguments: cli.args,
        extensions: cli.extensions,
        defaults_files: cli.defaults_files,
        calculate_reading_time: cli.reading_time,
        reading_speed: cli.reading_speed.map(serde_json::Value::from),
        formatted_fields: cli.formatted_fields,
        timeout_secs: cli.timeout,
        ..Default::default()
    };

    let reader = PandocReader::new(settings)?;
    for file in &cli.files {
        if !PandocReader::handles(file) {
            bail!("not a Pandoc Markdown file: {}", file.display());
        }
        let result = reader.read(file)?;
        if cli.metadata_only {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Object(result.metadata))?
            );
        } else {
            println!("{}", result.html);
        }
    }
    Ok(())
}
