// ============================================================================
// tubecrop-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern dispatch to the console and a per-run log file
//
// Console lines are kept short (`LEVEL message`). The log file, when one is
// requested, gets a timestamp and the emitting module on every line so runs
// can be reconstructed afterwards. ffmpeg-sidecar's own records are capped
// at `warn` in both outputs.

use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use tubecrop_core::CoreError;

use crate::error::CliResult;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `tubecrop_<command>_<timestamp>.log`
pub fn log_file_name(command: &str) -> String {
    format!("tubecrop_{}_{}.log", command, get_timestamp())
}

/// Level for our own crates given the `--verbose` flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
///
/// When `log_dir` is given the directory is created and a log file for this
/// run is opened inside it; its path is returned.
pub fn init_logging(log_dir: Option<&Path>, command: &str, verbose: bool) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);

    let console = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("{:<5} {}", record.level(), message)))
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new()
        .level(level)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|e| {
                CoreError::PathError(format!("Failed to create log directory '{}': {}", dir.display(), e))
            })?;
            let path = dir.join(log_file_name(command));
            let file = fern::log_file(&path)?;
            root = root.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "{} [{}] {}: {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .chain(file),
            );
            Some(path)
        }
        None => None,
    };

    root.apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))?;
    Ok(log_path)
}
