//! Fixed-length segment splitting.
//!
//! Stream-copies a source video into `<video_id>_NNNN.<container>` segments.
//! Tube frame indices are relative to these segments.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, run_ffmpeg, split_command};
use crate::temp_files::segment_files;

/// Splits `input` into segments in `split_dir` and returns them sorted.
///
/// # Errors
///
/// Any failure, including a run that produced no segments, is reported as
/// [`CoreError::SplitFailed`].
pub fn split_video<S: FfmpegSpawner>(
    spawner: &S,
    input: &Path,
    split_dir: &Path,
    video_id: &str,
    segment_seconds: u32,
    container: &str,
) -> CoreResult<Vec<PathBuf>> {
    let split_failed = |message: String| CoreError::SplitFailed {
        video_id: video_id.to_string(),
        message,
    };

    fs::create_dir_all(split_dir).map_err(|e| split_failed(e.to_string()))?;

    let cmd = split_command(input, split_dir, video_id, segment_seconds, container);
    run_ffmpeg(spawner, cmd, &format!("split {video_id}")).map_err(|e| split_failed(e.to_string()))?;

    let segments = segment_files(split_dir, video_id, container).map_err(|e| split_failed(e.to_string()))?;
    if segments.is_empty() {
        return Err(split_failed("no segments were written".to_string()));
    }

    info!("Split {} into {} segment(s)", input.display(), segments.len());
    Ok(segments)
}

/// Totals for a directory split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub split: usize,
    pub failed: usize,
    pub segments: usize,
}

/// Splits every `*.<container>` file in `input_dir`, one after another.
///
/// The video id of each file is its file stem. Failures are logged and
/// counted; the remaining files are still processed.
pub fn split_directory<S: FfmpegSpawner>(
    spawner: &S,
    input_dir: &Path,
    split_dir: &Path,
    segment_seconds: u32,
    container: &str,
) -> CoreResult<SplitSummary> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(container))
        })
        .collect();
    inputs.sort();

    let mut summary = SplitSummary::default();
    for input in &inputs {
        let Some(video_id) = input.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping file with non-UTF-8 name: {}", input.display());
            summary.failed += 1;
            continue;
        };

        match split_video(spawner, input, split_dir, video_id, segment_seconds, container) {
            Ok(segments) => {
                summary.split += 1;
                summary.segments += segments.len();
            }
            Err(e) => {
                error!("{}", e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
