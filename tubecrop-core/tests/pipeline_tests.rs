// tubecrop-core/tests/pipeline_tests.rs

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ffmpeg_sidecar::event::FfmpegEvent;
use tempfile::{TempDir, tempdir};
use tubecrop_core::config::{CoreConfig, CoreConfigBuilder};
use tubecrop_core::external::mocks::{MockFetcher, MockFfmpegSpawner, MockFfprobeExecutor};
use tubecrop_core::external::{FailureReason, FetchFailure, MediaProbe};
use tubecrop_core::processing::{
    NoopObserver, Pipeline, PipelineObserver, PipelineStage, VideoOutcome, VideoReport,
};
use tubecrop_core::{FrameRate, TubeIndex, parse_tube_line};

// Helper to create a dummy file with some content
fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content").expect("Failed to write dummy content");
    file_path
}

fn default_probe() -> MediaProbe {
    MediaProbe {
        height: 720,
        width: 1280,
        frame_rate: FrameRate::new(30, 1),
        has_audio: true,
    }
}

fn index_of(lines: &[&str]) -> TubeIndex {
    TubeIndex::new(
        lines
            .iter()
            .map(|l| parse_tube_line(l).expect("valid tube line"))
            .collect(),
    )
}

struct Dirs {
    _root: TempDir,
    raw: PathBuf,
    split: PathBuf,
    output: PathBuf,
}

fn dirs() -> Dirs {
    let root = tempdir().expect("Failed to create temp dir");
    let raw = root.path().join("raw");
    let split = root.path().join("split");
    let output = root.path().join("clips");
    Dirs {
        _root: root,
        raw,
        split,
        output,
    }
}

fn config_for(d: &Dirs, delete_temp: bool) -> CoreConfig {
    CoreConfigBuilder::new()
        .output_dir(d.output.clone())
        .raw_dir(d.raw.clone())
        .split_dir(d.split.clone())
        .workers(2)
        .delete_temp(delete_temp)
        .build()
        .expect("valid config")
}

#[derive(Default)]
struct RecordingObserver {
    stages: Mutex<Vec<(String, PipelineStage)>>,
    finished: Mutex<Vec<String>>,
}

impl PipelineObserver for RecordingObserver {
    fn stage_entered(&self, video_id: &str, stage: PipelineStage) {
        self.stages.lock().unwrap().push((video_id.to_string(), stage));
    }

    fn video_finished(&self, report: &VideoReport) {
        self.finished.lock().unwrap().push(report.video_id.clone());
    }
}

#[test]
fn test_process_video_success_cleans_up() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_success("vid");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("-segment_time", vec![], true);
    spawner.add_success_expectation("vid_0000_S", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(default_probe());

    let index = index_of(&["vid_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, true), spawner.clone(), prober, fetcher, index)?;

    let observer = RecordingObserver::default();
    let report = pipeline.process_video("vid", &observer);

    match &report.outcome {
        VideoOutcome::Completed { clips } => {
            assert_eq!(clips.produced, 1);
            assert!(clips.failures.is_empty());
        }
        other => panic!("Expected Completed, got {other:?}"),
    }
    assert!(d.output.join("vid_0000_S0_E29_L0_T0_R640_B360.mp4").exists());
    assert!(!d.raw.join("vid.mp4").exists(), "Raw file should be removed");
    assert!(!d.split.join("vid_0000.mp4").exists(), "Segment should be removed");
    assert_eq!(report.cleaned_files, 2);
    assert_eq!(spawner.get_received_calls().len(), 2);

    let stages: Vec<PipelineStage> = observer.stages.lock().unwrap().iter().map(|(_, s)| *s).collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Fetching,
            PipelineStage::Splitting,
            PipelineStage::CroppingTubes,
            PipelineStage::CleaningUp,
            PipelineStage::Done,
        ]
    );
    assert_eq!(*observer.finished.lock().unwrap(), vec!["vid".to_string()]);
    Ok(())
}

#[test]
fn test_fetch_failure_skips_everything_else() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_failure("vid", FetchFailure::new(FailureReason::Private, "Private video"));

    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&["vid_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, true), spawner.clone(), prober.clone(), fetcher, index)?;

    let report = pipeline.process_video("vid", &NoopObserver);
    match &report.outcome {
        VideoOutcome::FetchFailed { reason, .. } => assert_eq!(*reason, FailureReason::Private),
        other => panic!("Expected FetchFailed, got {other:?}"),
    }
    assert!(spawner.get_received_calls().is_empty());
    assert!(prober.probe_calls().is_empty());
    assert_eq!(report.cleaned_files, 0);
    Ok(())
}

#[test]
fn test_split_failure_removes_raw_file() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_success("vid");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_exit_error_expectation(
        "-segment_time",
        vec![FfmpegEvent::Error("Invalid data found when processing input".to_string())],
        1 << 8,
    );
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&["vid_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, true), spawner.clone(), prober.clone(), fetcher, index)?;

    let report = pipeline.process_video("vid", &NoopObserver);
    match &report.outcome {
        VideoOutcome::SplitFailed { message } => {
            assert!(message.contains("Invalid data found"), "message was: {message}");
        }
        other => panic!("Expected SplitFailed, got {other:?}"),
    }
    assert!(!d.raw.join("vid.mp4").exists());
    assert_eq!(report.cleaned_files, 1);
    assert_eq!(spawner.get_received_calls().len(), 1);
    assert!(prober.probe_calls().is_empty());
    Ok(())
}

#[test]
fn test_split_with_no_segments_is_a_failure() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_success("vid");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("-segment_time", vec![], false);
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&["vid_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, false), spawner, prober, fetcher, index)?;

    let report = pipeline.process_video("vid", &NoopObserver);
    assert!(matches!(report.outcome, VideoOutcome::SplitFailed { .. }));
    // delete_temp is off, so the raw file stays
    assert!(d.raw.join("vid.mp4").exists());
    Ok(())
}

#[test]
fn test_video_without_tubes_still_cleans_up() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_success("lonely");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("-segment_time", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&["other_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, true), spawner.clone(), prober.clone(), fetcher, index)?;

    let report = pipeline.process_video("lonely", &NoopObserver);
    assert!(matches!(report.outcome, VideoOutcome::NoTubes));
    assert_eq!(report.cleaned_files, 2);
    assert!(!d.split.join("lonely_0000.mp4").exists());
    assert!(prober.probe_calls().is_empty());
    assert_eq!(spawner.get_received_calls().len(), 1);
    Ok(())
}

#[test]
fn test_keep_temp_files_when_delete_disabled() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_success("vid");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("-segment_time", vec![], true);
    spawner.add_success_expectation("vid_0000_S", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&["vid_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, false), spawner, prober, fetcher, index)?;

    let observer = RecordingObserver::default();
    let report = pipeline.process_video("vid", &observer);
    assert!(matches!(report.outcome, VideoOutcome::Completed { .. }));
    assert_eq!(report.cleaned_files, 0);
    assert!(d.raw.join("vid.mp4").exists());
    assert!(d.split.join("vid_0000.mp4").exists());
    assert!(
        !observer
            .stages
            .lock()
            .unwrap()
            .iter()
            .any(|(_, s)| *s == PipelineStage::CleaningUp)
    );
    Ok(())
}

#[test]
fn test_existing_raw_file_is_reused() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    std::fs::create_dir_all(&d.raw)?;
    create_dummy_file(&d.raw, "vid.mp4");
    // No expectation: a real fetch would fail
    let fetcher = MockFetcher::new();

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("-segment_time", vec![], true);
    spawner.add_success_expectation("vid_0000_S", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&["vid_0000,720,1280,0,29,0,0,640,360"]);
    let pipeline = Pipeline::new(config_for(&d, true), spawner, prober, fetcher, index)?;

    let report = pipeline.process_video("vid", &NoopObserver);
    assert!(matches!(report.outcome, VideoOutcome::Completed { .. }));
    Ok(())
}

#[test]
fn test_run_continues_after_failed_video() -> Result<(), Box<dyn std::error::Error>> {
    let d = dirs();
    let fetcher = MockFetcher::new();
    fetcher.expect_failure("bad", FetchFailure::new(FailureReason::Unavailable, "Video unavailable"));
    fetcher.expect_success("good");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("-segment_time", vec![], true);
    spawner.add_success_expectation("good_0000_S", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(default_probe());
    let index = index_of(&[
        "bad_0000,720,1280,0,29,0,0,640,360",
        "good_0000,720,1280,0,29,0,0,640,360",
    ]);
    let pipeline = Pipeline::new(config_for(&d, true), spawner, prober, fetcher.clone(), index)?;

    let observer = RecordingObserver::default();
    let ids = vec!["bad".to_string(), "good".to_string()];
    let summary = pipeline.run(&ids, &observer);

    assert_eq!(fetcher.calls(), ids);
    assert_eq!(summary.videos.len(), 2);
    assert_eq!(summary.fetch_failed(), 1);
    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.clips.produced, 1);
    assert_eq!(*observer.finished.lock().unwrap(), ids);
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let d = dirs();
    let mut config = config_for(&d, true);
    config.workers = 0;
    let result = Pipeline::new(
        config,
        MockFfmpegSpawner::new(),
        MockFfprobeExecutor::new(),
        MockFetcher::new(),
        TubeIndex::new(Vec::new()),
    );
    assert!(result.is_err());
}
