// ============================================================================
// tubecrop-core/src/processing/batch.rs
// ============================================================================
//
// CLIP BATCHES: Bounded Parallel Execution of Clip Jobs
//
// Jobs are independent and share nothing but the filesystem. A batch is
// submitted to a fixed-size rayon pool and the caller blocks until every job
// has finished; completion order is not preserved. A failing job is recorded
// in the report and never stops its siblings.

use std::path::{Path, PathBuf};

use log::{error, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use super::clip::{ClipOutcome, ClipTranscoder, clip_paths};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::tubes::TubeRecord;

/// Creates the worker pool used for clip jobs.
pub fn build_worker_pool(workers: usize) -> CoreResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("tubecrop-clip-{i}"))
        .build()
        .map_err(|e| CoreError::WorkerPool(e.to_string()))
}

/// A clip job that ended in an error.
#[derive(Debug, Clone, Serialize)]
pub struct ClipFailure {
    pub segment_id: String,
    pub output: PathBuf,
    pub message: String,
}

/// Tally of one batch of clip jobs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClipReport {
    pub produced: usize,
    pub already_existed: usize,
    pub below_minimum: usize,
    pub input_missing: usize,
    /// Records skipped for bad geometry (zero reference size, overflow).
    pub invalid_records: usize,
    pub failures: Vec<ClipFailure>,
}

impl ClipReport {
    pub fn total(&self) -> usize {
        self.produced
            + self.already_existed
            + self.below_minimum
            + self.input_missing
            + self.invalid_records
            + self.failures.len()
    }

    pub fn record(&mut self, tube: &TubeRecord, output: &Path, result: &CoreResult<ClipOutcome>) {
        match result {
            Ok(ClipOutcome::Produced) => self.produced += 1,
            Ok(ClipOutcome::AlreadyExists) => self.already_existed += 1,
            Ok(ClipOutcome::BelowMinimumSize { .. }) => self.below_minimum += 1,
            Err(CoreError::InputMissing(path)) => {
                warn!("Input file {} does not exist, skipping", path.display());
                self.input_missing += 1;
            }
            Err(e) if e.is_record_level() => {
                warn!("Skipping tube {}: {}", tube.segment_id, e);
                self.invalid_records += 1;
            }
            Err(e) => {
                error!("Clip {} failed: {}", tube.segment_id, e);
                self.failures.push(ClipFailure {
                    segment_id: tube.segment_id.clone(),
                    output: output.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }

    pub fn merge(&mut self, other: ClipReport) {
        self.produced += other.produced;
        self.already_existed += other.already_existed;
        self.below_minimum += other.below_minimum;
        self.input_missing += other.input_missing;
        self.invalid_records += other.invalid_records;
        self.failures.extend(other.failures);
    }
}

/// Runs one clip job per tube on `pool` and waits for all of them.
///
/// Segments are read from `input_dir`; clips go to `config.output_dir`.
/// `on_done` is called from worker threads as each job finishes.
pub fn run_clip_jobs<S, P, C>(
    pool: &ThreadPool,
    spawner: &S,
    prober: &P,
    tubes: &[&TubeRecord],
    input_dir: &Path,
    config: &CoreConfig,
    on_done: C,
) -> CoreResult<ClipReport>
where
    S: FfmpegSpawner + Sync,
    P: FfprobeExecutor + Sync,
    C: Fn(&TubeRecord, &CoreResult<ClipOutcome>) + Sync,
{
    std::fs::create_dir_all(&config.output_dir)?;
    let transcoder = ClipTranscoder::new(spawner, prober, config.size_policy());

    let results: Vec<(&TubeRecord, PathBuf, CoreResult<ClipOutcome>)> = pool.install(|| {
        tubes
            .par_iter()
            .map(|&tube| {
                let (input, output) = clip_paths(tube, input_dir, &config.output_dir, &config.container);
                let result = transcoder.produce_clip(&input, &output, tube);
                on_done(tube, &result);
                (tube, output, result)
            })
            .collect()
    });

    let mut report = ClipReport::default();
    for (tube, output, result) in &results {
        report.record(tube, output, result);
    }
    Ok(report)
}
