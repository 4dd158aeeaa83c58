// ============================================================================
// tubecrop-cli/src/main.rs
// ============================================================================
//
// TUBECROP CLI: Entry point
//
// Parses arguments, installs logging, dispatches to the subcommand and maps
// any returned error to exit code 1. Everything that can make a run fatal is
// detected inside the command before work starts.

use std::process;

use clap::Parser;
use console::style;
use log::{error, info};

use tubecrop_cli::commands::{self, crop, download, filter, process as process_cmd, split};
use tubecrop_cli::logging::init_logging;
use tubecrop_cli::{Cli, CliResult, Commands};

fn run(cli: Cli) -> CliResult<()> {
    let log_dir = cli.log_dir.clone().or_else(|| commands::default_log_dir(&cli.command));
    let command_name = cli.command.name();

    if let Some(path) = init_logging(log_dir.as_deref(), command_name, cli.verbose)? {
        info!("Log file: {}", path.display());
    }

    match cli.command {
        Commands::Process(args) => process_cmd::run_process(args, log_dir.as_deref()),
        Commands::Crop(args) => crop::run_crop(args, log_dir.as_deref()),
        Commands::Split(args) => split::run_split(args),
        Commands::Download(args) => download::run_download(args, log_dir.as_deref()),
        Commands::Filter(args) => filter::run_filter(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if log::max_level() == log::LevelFilter::Off {
            // Logging never came up
            eprintln!("{} {}", style("Error:").red().bold(), e);
        } else {
            error!("{}", e);
        }
        process::exit(1);
    }
}
