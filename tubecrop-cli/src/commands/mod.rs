//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of one subcommand.

use std::path::{Path, PathBuf};

use crate::cli::Commands;

/// Full pipeline: fetch, split, crop and clean up each video.
pub mod process;

/// Batch crop against an existing segment directory.
pub mod crop;

/// Directory-wide segment splitting.
pub mod split;

/// Sequential, paced downloading of an id list.
pub mod download;

/// Reference-space size filter over a tube file.
pub mod filter;

/// Log directory used when `--log-dir` is not given.
///
/// Commands that write into an output directory log under `<output>/logs`;
/// `filter` only logs to the console.
pub fn default_log_dir(command: &Commands) -> Option<PathBuf> {
    let output: &Path = match command {
        Commands::Process(args) => &args.output_dir,
        Commands::Crop(args) => &args.output_dir,
        Commands::Split(args) => &args.output_dir,
        Commands::Download(args) => &args.output_dir,
        Commands::Filter(_) => return None,
    };
    Some(output.join("logs"))
}
