// ============================================================================
// tubecrop-core/src/processing/clip.rs
// ============================================================================
//
// CLIP TRANSCODER: One Tube In, One Cropped Clip Out
//
// Preconditions are evaluated in a fixed order and each one returns early
// without issuing a transcode:
//
//   1. output exists          -> ClipOutcome::AlreadyExists
//   2. input missing          -> CoreError::InputMissing
//   3. probe / rescale        -> CoreError::DivisionByZero and friends
//   4. box below SizePolicy   -> ClipOutcome::BelowMinimumSize
//
// Output existence is the only idempotency signal; content is never checked.
// The transcode writes to a per-process partial sibling of the output and is
// renamed into place only on success, so a failed or interrupted job never
// leaves a file that looks finished. The existence check is not atomic with
// the transcode: when another run finishes the same output first, the loser
// discards its partial file and reports AlreadyExists. A failing job removes
// only its own partial file, never the output.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::external::{ClipJob, FfmpegSpawner, FfprobeExecutor, run_ffmpeg};
use crate::geometry::{SizePolicy, rescale};
use crate::timing::align;
use crate::tubes::TubeRecord;

/// Non-error result of a clip job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipOutcome {
    /// The transcode ran and succeeded.
    Produced,
    /// The output file was already present.
    AlreadyExists,
    /// The rescaled box is smaller than the policy allows.
    BelowMinimumSize { crop_width: i64, crop_height: i64 },
}

/// Input and output paths of the clip job for `tube`.
pub fn clip_paths(tube: &TubeRecord, input_dir: &Path, output_dir: &Path, container: &str) -> (PathBuf, PathBuf) {
    (
        input_dir.join(tube.segment_file_name(container)),
        output_dir.join(tube.clip_file_name(container)),
    )
}

/// Sibling of `output` the transcode writes to before the clip is moved into place.
///
/// The name keeps the container extension so ffmpeg still picks the muxer
/// from it, and carries the process id so concurrent runs never share one.
pub fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!(".{stem}.{}.partial.{}", std::process::id(), ext.to_string_lossy()),
        None => format!(".{stem}.{}.partial", std::process::id()),
    };
    output.with_file_name(name)
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial output {}: {}", path.display(), e);
        }
    }
}

/// Issues trim+crop jobs against the transcoding engine.
pub struct ClipTranscoder<'a, S, P> {
    spawner: &'a S,
    prober: &'a P,
    policy: SizePolicy,
}

impl<'a, S: FfmpegSpawner, P: FfprobeExecutor> ClipTranscoder<'a, S, P> {
    pub fn new(spawner: &'a S, prober: &'a P, policy: SizePolicy) -> Self {
        Self {
            spawner,
            prober,
            policy,
        }
    }

    /// Produces the clip for `tube` from `input` into `output`.
    pub fn produce_clip(&self, input: &Path, output: &Path, tube: &TubeRecord) -> CoreResult<ClipOutcome> {
        if output.exists() {
            info!("Output file {} exists, skipping", output.display());
            return Ok(ClipOutcome::AlreadyExists);
        }

        if !input.exists() {
            return Err(CoreError::InputMissing(input.to_path_buf()));
        }

        let probe = self.prober.probe(input)?;
        let rescaled = rescale(&tube.crop_box(), tube.reference(), probe.resolution())?;

        if !self.policy.admits(&rescaled) {
            info!(
                "Skipping {}: crop size ({}x{}) is smaller than {}x{}",
                tube.segment_id,
                rescaled.crop_width(),
                rescaled.crop_height(),
                self.policy.min_width,
                self.policy.min_height
            );
            return Ok(ClipOutcome::BelowMinimumSize {
                crop_width: rescaled.crop_width(),
                crop_height: rescaled.crop_height(),
            });
        }

        let window = tube.trim_window();
        let audio = probe.has_audio.then(|| align(window, probe.frame_rate));
        if audio.is_none() {
            debug!("{} has no audio stream, producing video-only clip", input.display());
        }

        // A stale partial from an interrupted run would trip `-n`.
        let partial = partial_path(output);
        discard(&partial);

        let job = ClipJob {
            input,
            output: &partial,
            window,
            crop: rescaled,
            audio,
        };

        if let Err(e) = run_ffmpeg(self.spawner, job.to_command(), &tube.segment_id) {
            discard(&partial);
            return Err(CoreError::TranscodeFailed {
                output: output.to_path_buf(),
                message: e.to_string(),
            });
        }

        if output.exists() {
            info!("Output file {} was produced by another run, keeping it", output.display());
            discard(&partial);
            return Ok(ClipOutcome::AlreadyExists);
        }

        if let Err(e) = fs::rename(&partial, output) {
            discard(&partial);
            return Err(CoreError::TranscodeFailed {
                output: output.to_path_buf(),
                message: format!("could not move {} into place: {}", partial.display(), e),
            });
        }

        debug!("Produced clip {}", output.display());
        Ok(ClipOutcome::Produced)
    }
}
