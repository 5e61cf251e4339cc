//! CLI logic for the Nodemap tool.
//!
//! Reads a forest file, lays it out at the requested detail level, settles
//! the animation on a simulated clock and writes the resting map as SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use nodemap::{MapBuilder, NodeMapError, forest};

/// Run the Nodemap CLI application
///
/// # Errors
///
/// Returns `NodeMapError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Forest parsing errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), NodeMapError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing node map"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let builder = MapBuilder::new(app_config);
    let forest = builder.read_forest(&args.input)?;
    let detail_level = args
        .detail_level
        .unwrap_or_else(|| forest::max_depth(&forest));

    let mut state = builder.layout(forest, detail_level, args.viewport);
    builder.settle(&mut state, args.max_frames);

    if let Some(outline_path) = &args.outline {
        fs::write(outline_path, state.to_outline())?;
        info!(outline_file = outline_path; "Outline written");
    }

    builder.write_svg(&state, &args.output)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
