//! Nodemap CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use nodemap_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Panics are reported through miette too, not only returned errors
    miette::set_panic_hook();

    let args = Args::parse();

    // An unknown level is not fatal; the map still renders with less output
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Nodemap");
    debug!(args:?; "Parsed arguments");

    // Parse, lay out, settle and export in one pass
    if let Err(err) = nodemap_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();

        // Forest errors carry the JSON source, so the report can point at it
        for reportable in to_reportables(&err) {
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, &reportable)
                .expect("Writing to String buffer is infallible");

            error!("{writer}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
