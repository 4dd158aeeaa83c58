//! Core library for preparing cropped video-action clips from tube metadata.
//!
//! A tube is a bounding box plus an inclusive frame range inside one split
//! segment of a source video. This crate parses tube files, rescales boxes
//! onto the real frame geometry, aligns audio to the frame range and drives
//! ffmpeg to produce one clip per tube. The [`processing::Pipeline`] runs
//! fetch, split, crop and cleanup for each video in turn.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tubecrop_core::config::CoreConfigBuilder;
//! use tubecrop_core::external::{CrateFfprobeExecutor, SidecarSpawner, YtDlpFetcher};
//! use tubecrop_core::processing::{NoopObserver, Pipeline};
//! use tubecrop_core::tubes::TubeIndex;
//! use std::path::{Path, PathBuf};
//!
//! let config = CoreConfigBuilder::new()
//!     .output_dir(PathBuf::from("train/clips"))
//!     .build()
//!     .unwrap();
//! let index = TubeIndex::from_file(Path::new("train_video_tubes.txt")).unwrap();
//! let ids = index.video_ids();
//!
//! let pipeline = Pipeline::new(
//!     config,
//!     SidecarSpawner,
//!     CrateFfprobeExecutor::new(),
//!     YtDlpFetcher::new(),
//!     index,
//! )
//! .unwrap();
//! let summary = pipeline.run(&ids, &NoopObserver);
//! println!("{} videos completed", summary.completed());
//! ```

pub mod config;
pub mod download;
pub mod error;
pub mod external;
pub mod geometry;
pub mod processing;
pub mod reporting;
pub mod temp_files;
pub mod timing;
pub mod tubes;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use geometry::{CropBox, RescaledBox, Resolution, SizePolicy, rescale};
pub use timing::{AudioWindow, FrameRate, TrimWindow, align};
pub use tubes::{TubeIndex, TubeRecord, load_tubes, parse_tube_line, video_id_of};
pub use utils::format_duration;
