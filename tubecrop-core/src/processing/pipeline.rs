// ============================================================================
// tubecrop-core/src/processing/pipeline.rs
// ============================================================================
//
// PER-VIDEO PIPELINE: Fetch -> Split -> Crop -> Cleanup
//
// Each video moves through the stages strictly in order; a failure at any
// stage ends that video and the pipeline moves on to the next one.
//
//   Fetching ──fail──────────────────────────────────────────► Done
//      │
//   Splitting ──fail──► (delete raw if delete_temp) ─────────► Done
//      │
//   CroppingTubes ──no tubes──► (cleanup if delete_temp) ────► Done
//      │
//   CleaningUp (if delete_temp, regardless of clip results) ─► Done
//
// KEY COMPONENTS:
// - PipelineStage: the stages above
// - VideoOutcome / VideoReport: how one video ended
// - PipelineObserver: progress hooks for the CLI
// - Pipeline: owns collaborators and configuration, runs videos

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Local};
use log::{error, info, warn};
use rayon::ThreadPool;
use serde::Serialize;

use super::batch::{ClipFailure, ClipReport, build_worker_pool, run_clip_jobs};
use super::clip::ClipOutcome;
use super::split::split_video;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FailureReason, FfmpegSpawner, FfprobeExecutor, VideoFetcher};
use crate::temp_files::{CleanupReport, remove_video_artifacts};
use crate::tubes::{TubeIndex, TubeRecord};
use crate::utils::format_duration;

/// Stages of one video's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Fetching,
    Splitting,
    CroppingTubes,
    CleaningUp,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Fetching => "fetching",
            PipelineStage::Splitting => "splitting",
            PipelineStage::CroppingTubes => "cropping",
            PipelineStage::CleaningUp => "cleaning up",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How one video ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoOutcome {
    /// Clip jobs ran; individual clips may still have failed.
    Completed { clips: ClipReport },
    FetchFailed { reason: FailureReason, detail: String },
    SplitFailed { message: String },
    NoTubes,
}

/// Result of one video's pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub video_id: String,
    pub outcome: VideoOutcome,
    /// Number of temporary files removed.
    pub cleaned_files: usize,
    pub elapsed_secs: f64,
}

/// Totals for a multi-video run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Local>,
    pub elapsed_secs: f64,
    pub videos: Vec<VideoReport>,
    pub clips: ClipReport,
}

impl BatchSummary {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::Completed { .. }))
    }

    pub fn fetch_failed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::FetchFailed { .. }))
    }

    pub fn split_failed(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::SplitFailed { .. }))
    }

    pub fn without_tubes(&self) -> usize {
        self.count(|o| matches!(o, VideoOutcome::NoTubes))
    }

    fn count(&self, pred: impl Fn(&VideoOutcome) -> bool) -> usize {
        self.videos.iter().filter(|v| pred(&v.outcome)).count()
    }
}

/// Progress hooks. All methods default to no-ops.
pub trait PipelineObserver: Sync {
    fn video_started(&self, _video_id: &str, _index: usize, _total: usize) {}
    fn stage_entered(&self, _video_id: &str, _stage: PipelineStage) {}
    fn clips_started(&self, _video_id: &str, _count: usize) {}
    fn clip_finished(&self, _tube: &TubeRecord, _result: &CoreResult<ClipOutcome>) {}
    fn video_finished(&self, _report: &VideoReport) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Runs the per-video pipeline with injected collaborators.
pub struct Pipeline<S, P, F> {
    config: CoreConfig,
    spawner: S,
    prober: P,
    fetcher: F,
    index: TubeIndex,
    pool: ThreadPool,
}

impl<S, P, F> Pipeline<S, P, F>
where
    S: FfmpegSpawner + Sync,
    P: FfprobeExecutor + Sync,
    F: VideoFetcher,
{
    /// Validates `config` and builds the worker pool.
    pub fn new(config: CoreConfig, spawner: S, prober: P, fetcher: F, index: TubeIndex) -> CoreResult<Self> {
        config.validate()?;
        let pool = build_worker_pool(config.workers)?;
        Ok(Self {
            config,
            spawner,
            prober,
            fetcher,
            index,
            pool,
        })
    }

    fn cleanup(&self, raw_file: Option<&Path>, video_id: &str) -> CleanupReport {
        remove_video_artifacts(raw_file, &self.config.split_dir, video_id, &self.config.container)
    }

    /// Runs one video through every stage.
    pub fn process_video<O: PipelineObserver>(&self, video_id: &str, observer: &O) -> VideoReport {
        let start = Instant::now();
        let (outcome, cleaned_files) = self.drive(video_id, observer);
        observer.stage_entered(video_id, PipelineStage::Done);

        let report = VideoReport {
            video_id: video_id.to_string(),
            outcome,
            cleaned_files,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            "Finished {} in {} ({:.2}s)",
            video_id,
            format_duration(report.elapsed_secs),
            report.elapsed_secs
        );
        observer.video_finished(&report);
        report
    }

    fn drive<O: PipelineObserver>(&self, video_id: &str, observer: &O) -> (VideoOutcome, usize) {
        let config = &self.config;

        // ========================================================================
        // STEP 1: FETCH
        // ========================================================================

        observer.stage_entered(video_id, PipelineStage::Fetching);
        let fetched = match self.fetcher.fetch(video_id, &config.raw_dir) {
            Ok(fetched) => fetched,
            Err(failure) => {
                error!(
                    "{}",
                    CoreError::FetchFailed {
                        video_id: video_id.to_string(),
                        reason: failure.clone(),
                    }
                );
                return (
                    VideoOutcome::FetchFailed {
                        reason: failure.reason,
                        detail: failure.detail,
                    },
                    0,
                );
            }
        };

        // ========================================================================
        // STEP 2: SPLIT INTO FIXED-LENGTH SEGMENTS
        // ========================================================================

        observer.stage_entered(video_id, PipelineStage::Splitting);
        let split_start = Instant::now();
        if let Err(e) = split_video(
            &self.spawner,
            &fetched.path,
            &config.split_dir,
            video_id,
            config.segment_seconds,
            &config.container,
        ) {
            error!("{}", e);
            let cleaned = if config.delete_temp {
                observer.stage_entered(video_id, PipelineStage::CleaningUp);
                self.cleanup(Some(&fetched.path), video_id).removed.len()
            } else {
                0
            };
            return (
                VideoOutcome::SplitFailed {
                    message: e.to_string(),
                },
                cleaned,
            );
        }
        info!("Split elapsed time: {:.2}s", split_start.elapsed().as_secs_f64());

        // ========================================================================
        // STEP 3: CROP EVERY TUBE OF THIS VIDEO
        // ========================================================================

        observer.stage_entered(video_id, PipelineStage::CroppingTubes);
        let tubes = self.index.tubes_for(video_id);

        let outcome = if tubes.is_empty() {
            warn!("No tubes found for video {}", video_id);
            VideoOutcome::NoTubes
        } else {
            info!("Cropping {} tube(s) for {}", tubes.len(), video_id);
            observer.clips_started(video_id, tubes.len());
            let crop_start = Instant::now();

            let clips = match run_clip_jobs(
                &self.pool,
                &self.spawner,
                &self.prober,
                &tubes,
                &config.split_dir,
                config,
                |tube, result| observer.clip_finished(tube, result),
            ) {
                Ok(report) => report,
                Err(e) => {
                    // Only reachable when the output directory cannot be created.
                    error!("Could not run clip jobs for {}: {}", video_id, e);
                    ClipReport {
                        failures: tubes
                            .iter()
                            .map(|tube| ClipFailure {
                                segment_id: tube.segment_id.clone(),
                                output: config.output_dir.clone(),
                                message: e.to_string(),
                            })
                            .collect(),
                        ..ClipReport::default()
                    }
                }
            };
            info!(
                "Crop elapsed time: {:.2}s ({} produced, {} existing, {} too small, {} invalid, {} failed)",
                crop_start.elapsed().as_secs_f64(),
                clips.produced,
                clips.already_existed,
                clips.below_minimum,
                clips.invalid_records,
                clips.failures.len()
            );
            VideoOutcome::Completed { clips }
        };

        // ========================================================================
        // STEP 4: CLEAN UP TEMPORARY FILES
        // ========================================================================

        let cleaned = if config.delete_temp {
            observer.stage_entered(video_id, PipelineStage::CleaningUp);
            let report = self.cleanup(Some(&fetched.path), video_id);
            info!(
                "Deleted {} temporary file(s) for {}",
                report.removed.len(),
                video_id
            );
            report.removed.len()
        } else {
            0
        };

        (outcome, cleaned)
    }

    /// Runs every id in order. Each video is independent of the others.
    pub fn run<O: PipelineObserver>(&self, video_ids: &[String], observer: &O) -> BatchSummary {
        let started_at = Local::now();
        let start = Instant::now();
        let mut videos = Vec::with_capacity(video_ids.len());
        let mut clips = ClipReport::default();

        for (i, video_id) in video_ids.iter().enumerate() {
            info!("Processing video {}/{}: {}", i + 1, video_ids.len(), video_id);
            observer.video_started(video_id, i, video_ids.len());

            let report = self.process_video(video_id, observer);
            if let VideoOutcome::Completed { clips: c } = &report.outcome {
                clips.merge(c.clone());
            }
            videos.push(report);
            info!("----------------------------------------");
        }

        BatchSummary {
            started_at,
            elapsed_secs: start.elapsed().as_secs_f64(),
            videos,
            clips,
        }
    }
}
