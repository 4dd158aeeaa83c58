// ============================================================================
// tubecrop-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE INTERFACE: Argument Structures
//
// One subcommand per stage of dataset preparation. `process` runs the full
// per-video pipeline; the others expose single stages so an interrupted run
// can be finished by hand.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tubecrop_core::config::{
    DEFAULT_CONTAINER, DEFAULT_MIN_CROP_HEIGHT, DEFAULT_MIN_CROP_WIDTH, DEFAULT_RAW_DIR,
    DEFAULT_SEGMENT_SECONDS, DEFAULT_SPLIT_DIR, DEFAULT_WORKERS,
};
use tubecrop_core::download::{DEFAULT_SLEEP_MAX_SECS, DEFAULT_SLEEP_MIN_SECS};
use tubecrop_core::tubes::filter::DEFAULT_FILTER_MIN_SIZE;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Tubecrop: tube-driven crop/trim pipeline for video-action datasets",
    long_about = "Downloads source videos, splits them into fixed-length segments and \
                  cuts one cropped, trimmed clip per tube record using ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for log files and run reports
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, split, crop and clean up every listed video
    Process(ProcessArgs),
    /// Crop every tube against an existing directory of split segments
    Crop(CropArgs),
    /// Split every video of a directory into fixed-length segments
    Split(SplitArgs),
    /// Download a list of video ids one after another
    Download(DownloadArgs),
    /// Keep tubes whose reference-space box reaches a minimum size
    Filter(FilterArgs),
}

impl Commands {
    /// Short command name used in log and report file names.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Process(_) => "process",
            Commands::Crop(_) => "crop",
            Commands::Split(_) => "split",
            Commands::Download(_) => "download",
            Commands::Filter(_) => "filter",
        }
    }
}

/// Minimum rescaled crop size shared by `process` and `crop`.
#[derive(Args, Debug, Clone)]
pub struct CropSizeArgs {
    /// Minimum crop width in actual pixels
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_MIN_CROP_WIDTH)]
    pub min_crop_width: i64,

    /// Minimum crop height in actual pixels
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_MIN_CROP_HEIGHT)]
    pub min_crop_height: i64,

    /// Number of parallel clip jobs
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_WORKERS)]
    pub num_workers: usize,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// File with one video id per line
    #[arg(long, required = true, value_name = "FILE")]
    pub video_ids_file: PathBuf,

    /// Tube metadata file
    #[arg(long, required = true, value_name = "FILE")]
    pub tubes_file: PathBuf,

    /// Directory where cropped clips are written
    #[arg(long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Directory for downloaded raw videos
    #[arg(long, value_name = "DIR", default_value = DEFAULT_RAW_DIR)]
    pub temp_raw_dir: PathBuf,

    /// Directory for split segments
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SPLIT_DIR)]
    pub temp_split_dir: PathBuf,

    /// Keep raw videos and segments after each video
    #[arg(long)]
    pub keep_temp: bool,

    #[command(flatten)]
    pub size: CropSizeArgs,

    /// Segment length of the split stage, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SEGMENT_SECONDS)]
    pub segment_seconds: u32,

    /// Cookies file handed to yt-dlp
    #[arg(long, value_name = "FILE", env = "TUBECROP_COOKIES")]
    pub cookies: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CropArgs {
    /// Directory holding the split segments
    #[arg(long, required = true, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Tube metadata file
    #[arg(long, required = true, value_name = "FILE")]
    pub clip_info_file: PathBuf,

    /// Directory where cropped clips are written
    #[arg(long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub size: CropSizeArgs,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Directory holding the source videos
    #[arg(long, required = true, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Directory where segments are written
    #[arg(long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Segment length in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SEGMENT_SECONDS)]
    pub segment_seconds: u32,

    /// Container extension of the source videos and segments
    #[arg(long, value_name = "EXT", default_value = DEFAULT_CONTAINER)]
    pub container: String,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// File with one video id per line
    #[arg(long, required = true, value_name = "FILE")]
    pub input_list: PathBuf,

    /// Directory where videos are downloaded
    #[arg(long, value_name = "DIR", default_value = "data/youtube_videos")]
    pub output_dir: PathBuf,

    /// Cookies file handed to yt-dlp
    #[arg(long, value_name = "FILE", env = "TUBECROP_COOKIES")]
    pub cookies: Option<PathBuf>,

    /// Tab-separated session log, appended to across runs
    #[arg(long, value_name = "FILE", default_value = "videos_download.log")]
    pub log_file: PathBuf,

    /// Lower bound of the random pause before each download, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SLEEP_MIN_SECS)]
    pub sleep_min: f64,

    /// Upper bound of the random pause before each download, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SLEEP_MAX_SECS)]
    pub sleep_max: f64,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Tube metadata file to filter
    #[arg(long, required = true, value_name = "FILE")]
    pub input_file: PathBuf,

    /// Where the surviving tube lines are written
    #[arg(long, required = true, value_name = "FILE")]
    pub output_file: PathBuf,

    /// Where the unique video ids are written
    /// (defaults to <input dir>/train_video_ids_<W>x<H>.txt)
    #[arg(long, value_name = "FILE")]
    pub video_ids_output_file: Option<PathBuf>,

    /// Minimum reference-space box width
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_FILTER_MIN_SIZE)]
    pub min_width: i64,

    /// Minimum reference-space box height
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_FILTER_MIN_SIZE)]
    pub min_height: i64,
}
