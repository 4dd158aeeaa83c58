//! FFprobe integration for media analysis.
//!
//! Produces the [`MediaProbe`] the clip transcoder needs: the decoded frame
//! size and frame rate of the first video stream, and whether any audio
//! stream exists.

use std::path::Path;

use ffprobe::{FfProbe, FfProbeError, ffprobe};

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::geometry::Resolution;
use crate::timing::FrameRate;

/// Runtime facts about a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaProbe {
    pub height: i64,
    pub width: i64,
    pub frame_rate: FrameRate,
    pub has_audio: bool,
}

impl MediaProbe {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.height, self.width)
    }
}

/// Trait for probing media files.
pub trait FfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaProbe>;
}

/// Concrete implementation using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaProbe> {
        log::debug!("Running ffprobe (via crate) on: {}", input_path.display());
        match ffprobe(input_path) {
            Ok(metadata) => media_probe_from(&metadata, input_path),
            Err(err) => {
                log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
                Err(map_ffprobe_error(err))
            }
        }
    }
}

/// Extracts a [`MediaProbe`] from parsed ffprobe output.
pub fn media_probe_from(metadata: &FfProbe, input_path: &Path) -> CoreResult<MediaProbe> {
    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CoreError::NoVideoStream(input_path.to_path_buf()))?;

    let (width, height) = match (video_stream.width, video_stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        (w, h) => {
            return Err(CoreError::ProbeFailed(format!(
                "Invalid video dimensions in {}: width={:?}, height={:?}",
                input_path.display(),
                w,
                h
            )));
        }
    };

    let frame_rate = FrameRate::parse(&video_stream.r_frame_rate).unwrap_or_else(|| {
        log::warn!(
            "Unparseable frame rate '{}' in {}, using default",
            video_stream.r_frame_rate,
            input_path.display()
        );
        FrameRate::default()
    });

    let has_audio = metadata
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaProbe {
        height,
        width,
        frame_rate,
        has_audio,
    })
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error("ffprobe", output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::ProbeFailed(format!("ffprobe output deserialization: {err}"))
        }
        _ => CoreError::ProbeFailed(format!("Unknown ffprobe error: {err:?}")),
    }
}
