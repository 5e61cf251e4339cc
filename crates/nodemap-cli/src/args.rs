//! Command-line argument definitions for the Nodemap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the detail level and viewport of the snapshot, and logging
//! verbosity.

use clap::Parser;

use nodemap::geometry::Size;

/// Command-line arguments for the Nodemap tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input forest (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of expanded levels; defaults to the deepest level of the forest
    #[arg(short, long)]
    pub detail_level: Option<usize>,

    /// Viewport size in pixels, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_viewport)]
    pub viewport: Size,

    /// Also write a plain-text outline of the forest to this file
    #[arg(long)]
    pub outline: Option<String>,

    /// Upper bound on simulated animation frames before the snapshot
    #[arg(long, default_value_t = 10_000)]
    pub max_frames: usize,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Parses `WIDTHxHEIGHT` into a positive size.
pub fn parse_viewport(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;

    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|err| format!("invalid viewport dimension '{part}': {err}"))
    };
    let size = Size::new(parse(width)?, parse(height)?);
    if size.is_degenerate() {
        return Err(format!("viewport must have a positive area, got '{value}'"));
    }
    Ok(size)
}
