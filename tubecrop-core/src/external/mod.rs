// ============================================================================
// tubecrop-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ffprobe and yt-dlp
//
// Every external process the pipeline depends on sits behind a trait so the
// orchestration can be tested with mocks:
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: transcoding engine (ffmpeg-sidecar)
// - FfprobeExecutor: media probing (ffprobe crate)
// - VideoFetcher: source download (yt-dlp)
// - check_dependency: startup check that a tool can be executed

use std::io;
use std::process::{Command, Stdio};

use crate::error::{CoreError, CoreResult};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Command construction for clip and split jobs
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for probing media with ffprobe
pub mod ffprobe_executor;

/// Source video download
pub mod fetcher;

/// Mock collaborators for tests (feature "test-mocks")
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{ClipJob, split_command};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, MediaProbe};
pub use fetcher::{FailureReason, FetchFailure, FetchedVideo, VideoFetcher, YtDlpFetcher};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `cmd_name` can be executed by running it with `version_arg`.
///
/// The exit status is ignored; only the ability to start the process matters.
///
/// # Returns
///
/// * `Ok(())` - The command started
/// * `Err(CoreError::DependencyNotFound)` - The command is not on PATH
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Checks ffmpeg and ffprobe.
pub fn check_media_tools() -> CoreResult<()> {
    check_dependency("ffmpeg", "-version")?;
    check_dependency("ffprobe", "-version")
}

/// Checks yt-dlp.
pub fn check_downloader() -> CoreResult<()> {
    check_dependency("yt-dlp", "--version")
}
