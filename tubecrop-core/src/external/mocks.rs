// tubecrop-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.
#![cfg(feature = "test-mocks")]

use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard};

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;

use super::fetcher::{FailureReason, FetchFailure, FetchedVideo, VideoFetcher};
use super::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor, MediaProbe};
use crate::error::{CoreError, CoreResult};

// Shared state is behind Arc<Mutex> so the mocks can be used from the
// rayon worker pool.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("Mock failed to create parent dir {:?}: {}", parent, e);
        }
    }
    match std::fs::File::create(path) {
        Ok(_) => log::info!("Mock created dummy file: {:?}", path),
        Err(e) => log::error!("Mock failed to create dummy file {:?}: {}", path, e),
    }
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each expectation is consumed by the first call with an argument containing
/// its pattern. Calls with no matching expectation panic unless a default
/// success was configured.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
    default_success: Arc<Mutex<Option<bool>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// Unmatched calls succeed, optionally creating their output file.
    pub fn with_default_success(self, create_dummy_output: bool) -> Self {
        *lock(&self.default_success) = Some(create_dummy_output);
        self
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        lock(&self.expectations).push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: ExitStatus::from_raw(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    /// `exit_code` is a raw wait status; `1 << 8` is exit code 1.
    pub fn add_exit_error_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>, exit_code: i32) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: ExitStatus::from_raw(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        lock(&self.received_calls).clone()
    }

    /// Calls whose arguments contain `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        lock(&self.received_calls)
            .iter()
            .filter(|args| args.iter().any(|a| a.contains(pattern)))
            .count()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        lock(&self.received_calls).push(args.clone());

        let expectation = {
            let mut expectations = lock(&self.expectations);
            expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|index| expectations.remove(index))
        };

        let (result, create_dummy_output) = match expectation {
            Some(exp) => {
                log::info!("MockFfmpegSpawner: Matched expectation with pattern '{}'", exp.arg_pattern);
                (exp.result, exp.create_dummy_output)
            }
            None => match *lock(&self.default_success) {
                Some(create) => (
                    Ok(MockFfmpegProcess {
                        events_to_emit: Vec::new(),
                        exit_status: ExitStatus::from_raw(0),
                    }),
                    create,
                ),
                None => {
                    log::error!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
                    panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
                }
            },
        };

        if result.is_ok() && create_dummy_output {
            match args.last() {
                // Split jobs write a %04d pattern; materialise the first segment.
                Some(out) => touch(&PathBuf::from(out.replace("%04d", "0000"))),
                None => log::warn!("MockFfmpegSpawner couldn't find output path in args."),
            }
        }
        result
    }
}

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Arc<Mutex<HashMap<PathBuf, MediaProbe>>>,
    default_probe: Arc<Mutex<Option<MediaProbe>>>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Result returned for any path without a specific expectation.
    pub fn with_default(self, probe: MediaProbe) -> Self {
        *lock(&self.default_probe) = Some(probe);
        self
    }

    pub fn expect_probe(&self, input_path: &Path, probe: MediaProbe) {
        lock(&self.results).insert(input_path.to_path_buf(), probe);
    }

    pub fn probe_calls(&self) -> Vec<PathBuf> {
        lock(&self.calls).clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaProbe> {
        log::info!("MockFfprobeExecutor::probe called for: {}", input_path.display());
        lock(&self.calls).push(input_path.to_path_buf());

        let specific = lock(&self.results).get(input_path).copied();
        specific
            .or(*lock(&self.default_probe))
            .ok_or_else(|| {
                CoreError::ProbeFailed(format!(
                    "MockFfprobeExecutor: No expectation set for path {}",
                    input_path.display()
                ))
            })
    }
}

/// Mock implementation of VideoFetcher.
///
/// Ids without an expectation fail with `FailureReason::Error`.
#[derive(Clone)]
pub struct MockFetcher {
    container: String,
    results: Arc<Mutex<HashMap<String, Result<(), FetchFailure>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self {
            container: "mp4".to_string(),
            results: Arc::default(),
            calls: Arc::default(),
        }
    }
}

impl MockFetcher {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fetching `video_id` succeeds and creates an empty file.
    pub fn expect_success(&self, video_id: &str) {
        lock(&self.results).insert(video_id.to_string(), Ok(()));
    }

    pub fn expect_failure(&self, video_id: &str, failure: FetchFailure) {
        lock(&self.results).insert(video_id.to_string(), Err(failure));
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

impl VideoFetcher for MockFetcher {
    fn target_path(&self, video_id: &str, dest_dir: &Path) -> PathBuf {
        dest_dir.join(format!("{video_id}.{}", self.container))
    }

    fn fetch(&self, video_id: &str, dest_dir: &Path) -> Result<FetchedVideo, FetchFailure> {
        lock(&self.calls).push(video_id.to_string());
        let path = self.target_path(video_id, dest_dir);
        if path.is_file() {
            return Ok(FetchedVideo {
                path,
                already_present: true,
            });
        }

        let result = lock(&self.results).get(video_id).cloned();
        match result {
            Some(Ok(())) => {
                touch(&path);
                Ok(FetchedVideo {
                    path,
                    already_present: false,
                })
            }
            Some(Err(failure)) => Err(failure),
            None => Err(FetchFailure::new(
                FailureReason::Error,
                format!("MockFetcher: No expectation set for {video_id}"),
            )),
        }
    }
}
