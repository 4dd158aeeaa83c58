//! FFmpeg command builders for the two jobs the pipeline issues.
//!
//! - The clip job: frame-select, timestamp reset and crop on the first video
//!   stream, plus an aligned `atrim` on the first audio stream when present.
//! - The split job: stream-copied fixed-length segments named
//!   `<video_id>_%04d.<container>`.

use std::path::Path;

use ffmpeg_sidecar::command::FfmpegCommand;

use crate::geometry::RescaledBox;
use crate::timing::{AudioWindow, TrimWindow};

/// Builder for creating `FFmpeg` commands with common configurations
pub struct FfmpegCommandBuilder {
    cmd: FfmpegCommand,
    hide_banner: bool,
    overwrite: Option<bool>,
}

impl Default for FfmpegCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCommandBuilder {
    /// Creates a new `FFmpeg` command builder with sensible defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            cmd: FfmpegCommand::new(),
            hide_banner: true,
            overwrite: None,
        }
    }

    /// Sets whether to hide the `FFmpeg` banner
    #[must_use]
    pub fn with_hide_banner(mut self, hide: bool) -> Self {
        self.hide_banner = hide;
        self
    }

    /// `Some(true)` adds `-y`, `Some(false)` adds `-n`.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: Option<bool>) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Builds the `FFmpeg` command with all configured options
    #[must_use]
    pub fn build(mut self) -> FfmpegCommand {
        if self.hide_banner {
            self.cmd.arg("-hide_banner");
        }
        match self.overwrite {
            Some(true) => {
                self.cmd.arg("-y");
            }
            Some(false) => {
                self.cmd.arg("-n");
            }
            None => {}
        }
        self.cmd
    }
}

/// Builder for constructing filter chains
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<String>,
}

impl FilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty strings are ignored.
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Joins the chain with commas. `None` when empty.
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Declarative description of one clip job.
#[derive(Debug, Clone, Copy)]
pub struct ClipJob<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub window: TrimWindow,
    pub crop: RescaledBox,
    /// Present only when the source has an audio stream.
    pub audio: Option<AudioWindow>,
}

impl ClipJob<'_> {
    /// The `-filter_complex` graph for this job.
    pub fn filter_graph(&self) -> String {
        let video = FilterChain::new()
            .add_filter(self.window.select_expr())
            .add_filter("setpts=PTS-STARTPTS")
            .add_filter(self.crop.crop_filter())
            .build()
            .unwrap_or_default();
        let mut graph = format!("[0:v:0]{video}[v]");

        if let Some(audio) = self.audio {
            let audio = FilterChain::new()
                .add_filter(audio.atrim_filter())
                .add_filter("asetpts=PTS-STARTPTS")
                .build()
                .unwrap_or_default();
            graph.push_str(&format!(";[0:a:0]{audio}[a]"));
        }
        graph
    }

    /// Builds the ffmpeg command. Uses `-n` so an existing output is never replaced.
    pub fn to_command(&self) -> FfmpegCommand {
        let mut cmd = FfmpegCommandBuilder::new()
            .with_overwrite(Some(false))
            .build();
        cmd.input(self.input.to_string_lossy().as_ref());
        cmd.args(["-filter_complex", self.filter_graph().as_str()]);
        cmd.args(["-map", "[v]"]);
        if self.audio.is_some() {
            cmd.args(["-map", "[a]"]);
        }
        cmd.output(self.output.to_string_lossy().as_ref());
        cmd
    }
}

/// `HH:MM:SS` for ffmpeg's `-segment_time`.
pub fn segment_time(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Output pattern for the split job: `<dir>/<video_id>_%04d.<container>`.
pub fn segment_pattern(split_dir: &Path, video_id: &str, container: &str) -> String {
    split_dir
        .join(format!("{video_id}_%04d.{container}"))
        .to_string_lossy()
        .into_owned()
}

/// Stream-copy split of `input` into fixed-length segments.
///
/// Timestamps restart at zero in every segment so frame indices in tube
/// records line up with the segment rather than the parent video.
pub fn split_command(
    input: &Path,
    split_dir: &Path,
    video_id: &str,
    segment_seconds: u32,
    container: &str,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new().with_overwrite(Some(true)).build();
    cmd.input(input.to_string_lossy().as_ref());
    cmd.args(["-c", "copy", "-map", "0"]);
    cmd.args(["-segment_time", segment_time(segment_seconds).as_str()]);
    cmd.args(["-f", "segment", "-reset_timestamps", "1"]);
    cmd.output(segment_pattern(split_dir, video_id, container));
    cmd
}
