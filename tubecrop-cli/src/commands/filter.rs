//! Implementation of the 'filter' subcommand.
//!
//! Pure file-to-file work: no external tools are needed.

use log::info;
use tubecrop_core::SizePolicy;
use tubecrop_core::tubes::filter::default_id_list_path;
use tubecrop_core::tubes::{filter_by_size, load_tubes};
use tubecrop_core::utils::write_lines;

use crate::cli::FilterArgs;
use crate::error::{CliErrorContext, CliResult};

pub fn run_filter(args: FilterArgs) -> CliResult<()> {
    let policy = SizePolicy::new(args.min_width, args.min_height);
    let tubes = load_tubes(&args.input_file)?;
    let outcome = filter_by_size(&tubes.records, policy);

    write_lines(&args.output_file, outcome.kept.iter().map(|r| r.to_string()))
        .cli_with_context(|| format!("Writing {}", args.output_file.display()))?;

    let ids_path = args
        .video_ids_output_file
        .unwrap_or_else(|| default_id_list_path(&args.input_file, policy));
    write_lines(&ids_path, &outcome.video_ids)
        .cli_with_context(|| format!("Writing {}", ids_path.display()))?;

    info!(
        "Filtered {} tubes with size >= {}x{}",
        outcome.kept.len(),
        policy.min_width,
        policy.min_height
    );
    info!("Saved filtered tubes to {}", args.output_file.display());
    info!(
        "Saved {} unique video ids to {}",
        outcome.video_ids.len(),
        ids_path.display()
    );
    println!(
        "Filtered {} tubes with size >= {}x{}",
        outcome.kept.len(),
        policy.min_width,
        policy.min_height
    );
    Ok(())
}
