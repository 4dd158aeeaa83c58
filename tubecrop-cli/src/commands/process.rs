//! Implementation of the 'process' subcommand.
//!
//! Loads the tube index and id list, checks external tools, then hands every
//! video to the core pipeline and writes a JSON run report next to the logs.

use std::path::Path;
use std::time::Instant;

use console::style;
use log::{info, warn};
use tubecrop_core::config::CoreConfigBuilder;
use tubecrop_core::external::{
    CrateFfprobeExecutor, SidecarSpawner, YtDlpFetcher, check_downloader, check_media_tools,
};
use tubecrop_core::processing::{BatchSummary, Pipeline};
use tubecrop_core::reporting::write_run_report;
use tubecrop_core::utils::read_id_list;
use tubecrop_core::{TubeIndex, format_duration};

use crate::cli::ProcessArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::TerminalObserver;

pub fn run_process(args: ProcessArgs, log_dir: Option<&Path>) -> CliResult<()> {
    let total_start = Instant::now();

    // Fatal input conditions are all checked before the first download.
    let video_ids = read_id_list(&args.video_ids_file)?;
    let index = TubeIndex::from_file(&args.tubes_file)?;
    check_media_tools()?;
    check_downloader()?;

    let config = CoreConfigBuilder::new()
        .output_dir(args.output_dir)
        .raw_dir(args.temp_raw_dir)
        .split_dir(args.temp_split_dir)
        .min_crop_size(args.size.min_crop_width, args.size.min_crop_height)
        .workers(args.size.num_workers)
        .segment_seconds(args.segment_seconds)
        .delete_temp(!args.keep_temp)
        .cookies_file(args.cookies)
        .build()?;
    config.ensure_directories()?;

    info!("Video ids:        {} ({})", video_ids.len(), args.video_ids_file.display());
    info!("Tube records:     {} ({})", index.len(), args.tubes_file.display());
    info!("Output directory: {}", config.output_dir.display());
    info!("Raw directory:    {}", config.raw_dir.display());
    info!("Split directory:  {}", config.split_dir.display());
    info!(
        "Minimum crop:     {}x{}, {} worker(s), delete temp: {}",
        config.min_crop_width,
        config.min_crop_height,
        config.workers,
        if config.delete_temp { "on" } else { "off" }
    );

    if video_ids.is_empty() {
        warn!("No video ids in {}, nothing to do", args.video_ids_file.display());
        return Ok(());
    }

    let fetcher = YtDlpFetcher::new()
        .with_container(config.container.clone())
        .with_cookies(config.cookies_file.clone());
    let pipeline = Pipeline::new(config, SidecarSpawner, CrateFfprobeExecutor::new(), fetcher, index)?;

    let observer = TerminalObserver::new(video_ids.len());
    let summary = pipeline.run(&video_ids, &observer);
    observer.finish();

    print_summary(&summary);

    if let Some(dir) = log_dir {
        let path = write_run_report(dir, "process", &summary).cli_context("Writing run report")?;
        info!("Run report written to {}", path.display());
    }
    info!(
        "Total execution time: {}",
        format_duration(total_start.elapsed().as_secs_f64())
    );
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!("{}", style("PROCESS SUMMARY").bold().cyan());
    println!("  {:<16} {}", style("Videos:").bold(), summary.videos.len());
    println!("  {:<16} {}", style("Completed:").bold(), summary.completed());
    println!("  {:<16} {}", style("No tubes:").bold(), summary.without_tubes());
    println!("  {:<16} {}", style("Fetch failed:").bold(), summary.fetch_failed());
    println!("  {:<16} {}", style("Split failed:").bold(), summary.split_failed());
    println!("  {:<16} {}", style("Clips produced:").bold(), summary.clips.produced);
    println!("  {:<16} {}", style("Clips existing:").bold(), summary.clips.already_existed);
    println!("  {:<16} {}", style("Too small:").bold(), summary.clips.below_minimum);
    println!("  {:<16} {}", style("Invalid tubes:").bold(), summary.clips.invalid_records);
    println!("  {:<16} {}", style("Clips failed:").bold(), summary.clips.failures.len());
    println!(
        "  {:<16} {}",
        style("Elapsed:").bold(),
        format_duration(summary.elapsed_secs)
    );
}
