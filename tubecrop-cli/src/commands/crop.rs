//! Implementation of the 'crop' subcommand.
//!
//! Crops every tube of a tube file against segments that were split earlier,
//! using the same size policy and worker pool as the full pipeline.

use std::path::Path;
use std::time::Instant;

use console::style;
use log::info;
use tubecrop_core::config::CoreConfigBuilder;
use tubecrop_core::external::{CrateFfprobeExecutor, SidecarSpawner, check_media_tools};
use tubecrop_core::processing::{build_worker_pool, run_clip_jobs};
use tubecrop_core::reporting::write_run_report;
use tubecrop_core::tubes::load_tubes;
use tubecrop_core::{CoreError, TubeRecord, format_duration};

use crate::cli::CropArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::create_progress_bar;

pub fn run_crop(args: CropArgs, log_dir: Option<&Path>) -> CliResult<()> {
    let start = Instant::now();

    if !args.input_dir.is_dir() {
        return Err(CoreError::PathError(format!(
            "Input directory '{}' does not exist",
            args.input_dir.display()
        )));
    }
    let tubes = load_tubes(&args.clip_info_file)?;
    check_media_tools()?;

    let config = CoreConfigBuilder::new()
        .output_dir(args.output_dir)
        .min_crop_size(args.size.min_crop_width, args.size.min_crop_height)
        .workers(args.size.num_workers)
        .build()?;
    let pool = build_worker_pool(config.workers)?;

    info!(
        "Cropping {} tube(s) from {} into {} ({} skipped line(s))",
        tubes.records.len(),
        args.input_dir.display(),
        config.output_dir.display(),
        tubes.skipped.len()
    );

    let refs: Vec<&TubeRecord> = tubes.records.iter().collect();
    let pb = create_progress_bar(refs.len() as u64, "cropping");
    let report = run_clip_jobs(
        &pool,
        &SidecarSpawner,
        &CrateFfprobeExecutor::new(),
        &refs,
        &args.input_dir,
        &config,
        |_, _| pb.inc(1),
    )?;
    pb.finish_and_clear();

    println!();
    println!("{}", style("CROP SUMMARY").bold().cyan());
    println!("  {:<15} {}", style("Tubes:").bold(), report.total());
    println!("  {:<15} {}", style("Produced:").bold(), report.produced);
    println!("  {:<15} {}", style("Existing:").bold(), report.already_existed);
    println!("  {:<15} {}", style("Too small:").bold(), report.below_minimum);
    println!("  {:<15} {}", style("Missing input:").bold(), report.input_missing);
    println!("  {:<15} {}", style("Invalid:").bold(), report.invalid_records);
    println!("  {:<15} {}", style("Failed:").bold(), report.failures.len());
    println!(
        "  {:<15} {}",
        style("Elapsed:").bold(),
        format_duration(start.elapsed().as_secs_f64())
    );

    if let Some(dir) = log_dir {
        let path = write_run_report(dir, "crop", &report).cli_context("Writing run report")?;
        info!("Run report written to {}", path.display());
    }
    Ok(())
}
