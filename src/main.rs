//! StitchKit CLI
//!
//! Usage:
//!   stitchkit generate <pattern.json> [-o <out.gcode>] [-c <config>] [--preview]
//!   stitchkit preview <program.gcode> [--colors N]
//!   stitchkit init-config [<path>]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stitchkit::{
    decode_file, init_logging, parameters_from_config, Config, GenerationSession, Preview,
    BUILD_DATE, VERSION,
};

/// Embroidery pattern to machine G-code converter
#[derive(Parser, Debug)]
#[command(name = "stitchkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON or TOML); defaults to the user config
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a stitch pattern into G-code
    Generate {
        /// Stitch pattern (JSON)
        #[arg(value_name = "PATTERN")]
        pattern: PathBuf,

        /// Where to write the G-code
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Decode the result and print the colour groups
        #[arg(long)]
        preview: bool,
    },

    /// Decode a G-code file and print its colour groups
    Preview {
        /// G-code program
        #[arg(value_name = "PROGRAM")]
        file: PathBuf,

        /// Expected number of colours; counted from the file when omitted
        #[arg(long)]
        colors: Option<u32>,
    },

    /// Write the default configuration
    InitConfig {
        /// Destination, the user config location when omitted
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Config::default_path().context("Failed to locate the configuration directory"),
    }
}

fn write_preview(out: &mut dyn Write, preview: &Preview) -> io::Result<()> {
    writeln!(out, "{} colour group(s), {} point(s)", preview.len(), preview.point_count())?;
    for group in &preview.groups {
        writeln!(
            out,
            "  colour {:>2}  {}  {} point(s)",
            group.color_index + 1,
            group.color,
            group.points.len()
        )?;
    }
    if let Some(bounds) = preview.bounds() {
        writeln!(
            out,
            "  extent {:.2} x {:.2} (X {:.2}..{:.2}, Y {:.2}..{:.2})",
            bounds.width(),
            bounds.height(),
            bounds.min_x,
            bounds.max_x,
            bounds.min_y,
            bounds.max_y
        )?;
    }
    Ok(())
}

/// Stream for human-readable reports
///
/// stdout is reserved for the program itself when it is not exported.
fn report_stream(output: Option<&Path>) -> Box<dyn Write> {
    match output {
        Some(_) => Box::new(io::stdout()),
        None => Box::new(io::stderr()),
    }
}

/// Record `pattern` in the recent files of an existing configuration
///
/// Returns whether the configuration was updated.
fn remember_pattern(config_file: &Path, config: &mut Config, pattern: &Path) -> bool {
    if !config_file.is_file() {
        tracing::debug!(
            "No configuration at {}, recent files not recorded",
            config_file.display()
        );
        return false;
    }

    config.add_recent_file(pattern.to_path_buf());
    match config.save_to_file(config_file) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Could not update recent files in {}: {}", config_file.display(), e);
            false
        }
    }
}

fn cmd_generate(
    config_file: Option<PathBuf>,
    pattern: &Path,
    output: Option<PathBuf>,
    preview: bool,
) -> Result<()> {
    let config_file = config_path(config_file)?;
    let mut config = Config::load_or_default(&config_file)
        .with_context(|| format!("Failed to load configuration {}", config_file.display()))?;

    let mut session = GenerationSession::new(parameters_from_config(&config));
    let summary = session
        .generate_from_file(pattern)
        .with_context(|| format!("Failed to generate G-code for {}", pattern.display()))?;

    let mut report = report_stream(output.as_deref());
    writeln!(
        report,
        "Generated {} lines, {} stitches, {} colour(s)",
        summary.line_count, summary.stitch_count, summary.color_count
    )?;

    if preview {
        write_preview(&mut *report, &session.preview()?)?;
    }

    match output {
        Some(dest) => {
            session.export(&dest)?;
            writeln!(report, "Wrote {}", dest.display())?;
        }
        None => {
            if let Some(artifact) = session.artifact() {
                let mut program = std::fs::File::open(artifact.path())?;
                io::copy(&mut program, &mut io::stdout().lock())?;
            }
        }
    }

    remember_pattern(&config_file, &mut config, pattern);

    Ok(())
}

fn cmd_preview(file: &Path, colors: Option<u32>) -> Result<()> {
    let preview = decode_file(file, colors)
        .with_context(|| format!("Failed to decode {}", file.display()))?;
    write_preview(&mut io::stdout().lock(), &preview)?;
    Ok(())
}

fn cmd_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = config_path(path)?;
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, use --force to overwrite",
            path.display()
        );
    }

    Config::default()
        .save_to_file(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    tracing::debug!("StitchKit {} (built {})", VERSION, BUILD_DATE);

    match cli.command {
        Commands::Generate {
            pattern,
            output,
            preview,
        } => cmd_generate(cli.config, &pattern, output, preview),
        Commands::Preview { file, colors } => cmd_preview(&file, colors),
        Commands::InitConfig { path, force } => cmd_init_config(path.or(cli.config), force),
    }
}
