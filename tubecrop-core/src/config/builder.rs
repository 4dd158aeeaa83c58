// ============================================================================
// tubecrop-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig with defaults for every optional field.
// `build()` validates the result instead of panicking on bad input.

use std::path::PathBuf;

use super::CoreConfig;
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory where cropped clips are written.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.config.output_dir = output_dir;
        self
    }

    /// Sets the directory for fetched raw videos.
    pub fn raw_dir(mut self, raw_dir: PathBuf) -> Self {
        self.config.raw_dir = raw_dir;
        self
    }

    /// Sets the directory for split segments.
    pub fn split_dir(mut self, split_dir: PathBuf) -> Self {
        self.config.split_dir = split_dir;
        self
    }

    /// Sets the minimum crop size in actual pixels.
    pub fn min_crop_size(mut self, width: i64, height: i64) -> Self {
        self.config.min_crop_width = width;
        self.config.min_crop_height = height;
        self
    }

    /// Sets the size of the clip worker pool.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Sets the split segment length in seconds.
    pub fn segment_seconds(mut self, seconds: u32) -> Self {
        self.config.segment_seconds = seconds;
        self
    }

    /// Sets the container extension (e.g. "mp4").
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.config.container = container.into();
        self
    }

    /// Sets whether temporary artifacts are deleted after each video.
    pub fn delete_temp(mut self, delete: bool) -> Self {
        self.config.delete_temp = delete;
        self
    }

    /// Sets an optional cookies file for the downloader.
    pub fn cookies_file(mut self, cookies: Option<PathBuf>) -> Self {
        self.config.cookies_file = cookies;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
