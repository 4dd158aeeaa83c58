//! Configuration structures and constants for the tubecrop-core library.
//!
//! All pipeline behavior is driven by an explicit `CoreConfig` handed to the
//! orchestrator at construction; nothing is read from global state.

mod builder;

use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::geometry::SizePolicy;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default minimum crop width in actual pixels. Narrower boxes are skipped.
pub const DEFAULT_MIN_CROP_WIDTH: i64 = 256;

/// Default minimum crop height in actual pixels.
pub const DEFAULT_MIN_CROP_HEIGHT: i64 = 256;

/// Default number of parallel clip workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Length of the stream-copied segments produced by the split stage.
pub const DEFAULT_SEGMENT_SECONDS: u32 = 60;

/// Container extension used for fetched files, segments and clips.
pub const DEFAULT_CONTAINER: &str = "mp4";

/// Where fetched raw videos land when no directory is given.
pub const DEFAULT_RAW_DIR: &str = "train/temp_raw_videos";

/// Where split segments land when no directory is given.
pub const DEFAULT_SPLIT_DIR: &str = "train/temp_1min_clips";

/// Main configuration structure for the tubecrop-core library.
///
/// Created by the consumer (usually tubecrop-cli) and passed to
/// [`crate::processing::Pipeline`] and the batch functions.
///
/// # Examples
///
/// ```rust
/// use tubecrop_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir(PathBuf::from("clips"))
///     .min_crop_size(512, 512)
///     .workers(4)
///     .delete_temp(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.size_policy().min_width, 512);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory where cropped clips are written
    pub output_dir: PathBuf,

    /// Directory holding fetched raw videos
    pub raw_dir: PathBuf,

    /// Directory holding fixed-length split segments
    pub split_dir: PathBuf,

    /// Minimum crop width (actual pixels)
    pub min_crop_width: i64,

    /// Minimum crop height (actual pixels)
    pub min_crop_height: i64,

    /// Size of the clip worker pool
    pub workers: usize,

    /// Segment length of the split stage, in seconds
    pub segment_seconds: u32,

    /// Container extension, without the leading dot
    pub container: String,

    /// Delete the raw file and split segments after each video
    pub delete_temp: bool,

    /// Optional cookies file handed to the downloader
    pub cookies_file: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            split_dir: PathBuf::from(DEFAULT_SPLIT_DIR),
            min_crop_width: DEFAULT_MIN_CROP_WIDTH,
            min_crop_height: DEFAULT_MIN_CROP_HEIGHT,
            workers: DEFAULT_WORKERS,
            segment_seconds: DEFAULT_SEGMENT_SECONDS,
            container: DEFAULT_CONTAINER.to_string(),
            delete_temp: true,
            cookies_file: None,
        }
    }
}

impl CoreConfig {
    /// The active minimum-size policy.
    #[must_use]
    pub fn size_policy(&self) -> SizePolicy {
        SizePolicy::new(self.min_crop_width, self.min_crop_height)
    }

    /// Checks the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.workers == 0 {
            return Err(CoreError::Config("workers must be at least 1".to_string()));
        }
        if self.segment_seconds == 0 {
            return Err(CoreError::Config(
                "segment length must be at least 1 second".to_string(),
            ));
        }
        if self.container.trim().is_empty() || self.container.contains('.') {
            return Err(CoreError::Config(format!(
                "invalid container extension '{}'",
                self.container
            )));
        }
        if self.min_crop_width < 0 || self.min_crop_height < 0 {
            return Err(CoreError::Config(format!(
                "minimum crop size must not be negative ({}x{})",
                self.min_crop_width, self.min_crop_height
            )));
        }
        Ok(())
    }

    /// Creates the output, raw and split directories.
    pub fn ensure_directories(&self) -> CoreResult<()> {
        for dir in [&self.output_dir, &self.raw_dir, &self.split_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                CoreError::PathError(format!(
                    "Failed to create directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
