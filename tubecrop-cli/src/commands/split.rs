//! Implementation of the 'split' subcommand.

use std::time::Instant;

use console::style;
use log::info;
use tubecrop_core::external::{SidecarSpawner, check_media_tools};
use tubecrop_core::processing::split_directory;
use tubecrop_core::{CoreError, format_duration};

use crate::cli::SplitArgs;
use crate::error::{CliErrorContext, CliResult};

pub fn run_split(args: SplitArgs) -> CliResult<()> {
    let start = Instant::now();

    if args.segment_seconds == 0 {
        return Err(CoreError::Config("segment length must be at least 1 second".to_string()));
    }
    if !args.input_dir.is_dir() {
        return Err(CoreError::PathError(format!(
            "Input directory '{}' does not exist",
            args.input_dir.display()
        )));
    }
    check_media_tools()?;
    std::fs::create_dir_all(&args.output_dir)
        .cli_with_context(|| format!("Creating output directory '{}'", args.output_dir.display()))?;

    info!(
        "Splitting *.{} in {} into {}s segments in {}",
        args.container,
        args.input_dir.display(),
        args.segment_seconds,
        args.output_dir.display()
    );
    let summary = split_directory(
        &SidecarSpawner,
        &args.input_dir,
        &args.output_dir,
        args.segment_seconds,
        &args.container,
    )?;

    println!();
    println!("{}", style("SPLIT SUMMARY").bold().cyan());
    println!("  {:<10} {}", style("Split:").bold(), summary.split);
    println!("  {:<10} {}", style("Failed:").bold(), summary.failed);
    println!("  {:<10} {}", style("Segments:").bold(), summary.segments);
    println!(
        "  {:<10} {}",
        style("Elapsed:").bold(),
        format_duration(start.elapsed().as_secs_f64())
    );
    Ok(())
}
