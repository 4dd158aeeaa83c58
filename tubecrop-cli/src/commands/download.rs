//! Implementation of the 'download' subcommand.
//!
//! Downloads are strictly sequential with a random pause before each one;
//! the core session handles pacing, back-off and the TSV log.

use std::path::Path;

use console::style;
use log::info;
use tubecrop_core::download::{DownloadOptions, DownloadStatus, download_all};
use tubecrop_core::external::{YtDlpFetcher, check_downloader};
use tubecrop_core::reporting::write_run_report;
use tubecrop_core::utils::read_id_list;
use tubecrop_core::{CoreError, format_duration};

use crate::cli::DownloadArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::create_progress_bar;

pub fn run_download(args: DownloadArgs, log_dir: Option<&Path>) -> CliResult<()> {
    if args.sleep_min < 0.0 || args.sleep_max < args.sleep_min {
        return Err(CoreError::Config(format!(
            "invalid sleep range {}..{} seconds",
            args.sleep_min, args.sleep_max
        )));
    }

    let video_ids = read_id_list(&args.input_list)?;
    check_downloader()?;

    let fetcher = YtDlpFetcher::new().with_cookies(args.cookies);
    let options = DownloadOptions {
        sleep_min_secs: args.sleep_min,
        sleep_max_secs: args.sleep_max,
        log_file: Some(args.log_file.clone()),
        ..DownloadOptions::default()
    };

    info!(
        "Downloading {} video(s) into {} (log: {})",
        video_ids.len(),
        args.output_dir.display(),
        args.log_file.display()
    );

    let pb = create_progress_bar(video_ids.len() as u64, "downloading");
    let summary = download_all(&fetcher, &video_ids, &args.output_dir, &options, |_, id, status| {
        let label = match status {
            DownloadStatus::Ok => style("ok").green(),
            DownloadStatus::Exists => style("exists").dim(),
            DownloadStatus::Failed { .. } => style("failed").red().bold(),
        };
        pb.println(format!("{label} {id}"));
        pb.inc(1);
    })
    .cli_context("Download session")?;
    pb.finish_and_clear();

    println!();
    println!("{}", style("DOWNLOAD SUMMARY").bold().cyan());
    println!("  {:<10} {}", style("OK:").bold(), summary.ok);
    println!("  {:<10} {}", style("Exists:").bold(), summary.exists);
    println!("  {:<10} {}", style("Failed:").bold(), summary.failed);
    println!("  {:<10} {}", style("Total:").bold(), summary.total);
    println!(
        "  {:<10} {}",
        style("Elapsed:").bold(),
        format_duration(summary.elapsed_secs)
    );

    if let Some(dir) = log_dir {
        let path = write_run_report(dir, "download", &summary).cli_context("Writing run report")?;
        info!("Run report written to {}", path.display());
    }
    Ok(())
}
