// tubecrop-core/tests/clip_transcoder_tests.rs

use std::fs::{self, File};
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use tempfile::tempdir;
use tubecrop_core::config::CoreConfigBuilder;
use tubecrop_core::external::mocks::{MockFfmpegProcess, MockFfmpegSpawner, MockFfprobeExecutor};
use tubecrop_core::external::{FfmpegSpawner, MediaProbe};
use tubecrop_core::processing::{ClipOutcome, ClipTranscoder, build_worker_pool, clip_paths, run_clip_jobs};
use tubecrop_core::{CoreError, CoreResult, FrameRate, SizePolicy, parse_tube_line};

// Helper to create a dummy file with some content
fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content").expect("Failed to write dummy content");
    file_path
}

/// Spawner standing in for a second run that finishes `finished_clip` while
/// this run's transcode is in flight.
struct ConcurrentRunSpawner {
    finished_clip: PathBuf,
    exit_code: i32,
}

impl FfmpegSpawner for ConcurrentRunSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        fs::write(&self.finished_clip, b"finished by the other run")?;

        let mut events = Vec::new();
        if self.exit_code == 0 {
            // Our own transcode lands in the path ffmpeg was told to write.
            let target = cmd
                .get_args()
                .last()
                .map(|a| PathBuf::from(a.to_string_lossy().into_owned()))
                .expect("output argument");
            fs::write(target, b"our clip")?;
        } else {
            events.push(FfmpegEvent::Error(format!(
                "File '{}' already exists. Exiting.",
                self.finished_clip.display()
            )));
        }
        Ok(MockFfmpegProcess {
            events_to_emit: events,
            exit_status: ExitStatus::from_raw(self.exit_code << 8),
        })
    }
}

fn probe_720p(has_audio: bool) -> MediaProbe {
    MediaProbe {
        height: 720,
        width: 1280,
        frame_rate: FrameRate::new(30, 1),
        has_audio,
    }
}

#[test]
fn test_second_call_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    let tube = parse_tube_line("vid_0000,720,1280,1015,1107,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("vid_0000_S1015_E1107", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));
    let transcoder = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(256, 256));

    assert_eq!(transcoder.produce_clip(&input, &output, &tube)?, ClipOutcome::Produced);
    assert!(output.exists());
    assert_eq!(transcoder.produce_clip(&input, &output, &tube)?, ClipOutcome::AlreadyExists);

    assert_eq!(spawner.get_received_calls().len(), 1);
    assert_eq!(prober.probe_calls().len(), 1);
    Ok(())
}

#[test]
fn test_job_carries_trim_crop_and_audio_window() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    // 360p reference onto a 720p file doubles every coordinate
    let tube = parse_tube_line("vid_0000,360,640,1015,1107,10,20,330,200")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("vid_0000_S1015", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));
    ClipTranscoder::new(&spawner, &prober, SizePolicy::new(0, 0)).produce_clip(&input, &output, &tube)?;

    let args = spawner.get_received_calls().remove(0);
    let graph = args
        .iter()
        .find(|a| a.contains("select="))
        .expect("filter graph argument");
    assert!(graph.contains("select=between(n\\,1015\\,1107)"));
    assert!(graph.contains("setpts=PTS-STARTPTS"));
    assert!(graph.contains("crop=640:360:20:40"));
    assert!(graph.contains("atrim=start=33.8333"));
    assert!(graph.contains(":duration=3.1"));
    assert!(graph.contains("asetpts=PTS-STARTPTS"));
    assert!(args.contains(&"[a]".to_string()));
    Ok(())
}

#[test]
fn test_video_only_source_still_produces_clip() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    let tube = parse_tube_line("vid_0000,720,1280,0,29,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("vid_0000_S0", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(false));
    let outcome = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(256, 256)).produce_clip(&input, &output, &tube)?;

    assert_eq!(outcome, ClipOutcome::Produced);
    let args = spawner.get_received_calls().remove(0);
    assert!(!args.iter().any(|a| a.contains("atrim")));
    assert!(!args.contains(&"[a]".to_string()));
    Ok(())
}

#[test]
fn test_size_policy_boundary() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    // 256x256 box at identical reference and actual resolution
    let tube = parse_tube_line("vid_0000,720,1280,0,29,100,100,356,356")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));

    let spawner = MockFfmpegSpawner::new();
    let outcome = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(257, 256)).produce_clip(&input, &output, &tube)?;
    assert_eq!(
        outcome,
        ClipOutcome::BelowMinimumSize {
            crop_width: 256,
            crop_height: 256
        }
    );
    assert!(spawner.get_received_calls().is_empty());

    spawner.add_success_expectation("vid_0000_S0", vec![], true);
    let outcome = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(256, 256)).produce_clip(&input, &output, &tube)?;
    assert_eq!(outcome, ClipOutcome::Produced);
    Ok(())
}

#[test]
fn test_missing_input_and_zero_reference() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    let spawner = MockFfmpegSpawner::new();
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));
    let transcoder = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(0, 0));

    let tube = parse_tube_line("vid_0000,720,1280,0,29,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");
    let err = transcoder.produce_clip(&input, &output, &tube).unwrap_err();
    assert!(matches!(err, CoreError::InputMissing(_)));

    create_dummy_file(input_dir.path(), "vid_0001.mp4");
    let tube = parse_tube_line("vid_0001,0,1280,0,29,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");
    let err = transcoder.produce_clip(&input, &output, &tube).unwrap_err();
    assert!(matches!(err, CoreError::DivisionByZero { height: 0, .. }));
    assert!(err.is_record_level());

    assert!(spawner.get_received_calls().is_empty());
    Ok(())
}

#[test]
fn test_failed_job_does_not_stop_siblings() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    for name in ["vid_0000.mp4", "vid_0001.mp4", "vid_0002.mp4"] {
        create_dummy_file(input_dir.path(), name);
    }

    let tubes = [
        parse_tube_line("vid_0000,720,1280,0,29,0,0,640,360")?,
        parse_tube_line("vid_0001,720,1280,0,29,0,0,640,360")?,
        parse_tube_line("vid_0002,720,1280,0,29,0,0,640,360")?,
        parse_tube_line("vid_0003,720,1280,0,29,0,0,640,360")?, // no segment on disk
        parse_tube_line("vid_0000,720,1280,30,59,0,0,100,100")?, // too small
        parse_tube_line("vid_0002,0,1280,30,59,0,0,640,360")?, // zero reference height
        parse_tube_line("vid_0002,720,1280,60,89,0,0,9000000000000000000,360")?, // overflows when scaled
    ];
    let refs: Vec<_> = tubes.iter().collect();

    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("vid_0000_S0", vec![], true);
    spawner.add_exit_error_expectation(
        "vid_0001_S0",
        vec![FfmpegEvent::Error("Conversion failed!".to_string())],
        256,
    );
    spawner.add_success_expectation("vid_0002_S0", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));

    let config = CoreConfigBuilder::new()
        .output_dir(output_dir.path().to_path_buf())
        .workers(3)
        .build()?;
    let pool = build_worker_pool(config.workers)?;

    let report = run_clip_jobs(&pool, &spawner, &prober, &refs, input_dir.path(), &config, |_, _| {})?;
    assert_eq!(report.produced, 2);
    assert_eq!(report.input_missing, 1);
    assert_eq!(report.below_minimum, 1);
    assert_eq!(report.invalid_records, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].segment_id, "vid_0001");
    assert!(report.failures[0].message.contains("Conversion failed!"));
    assert_eq!(report.total(), 7);
    Ok(())
}

#[test]
fn test_failed_job_never_removes_another_runs_clip() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    let tube = parse_tube_line("vid_0000,720,1280,0,29,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");
    let spawner = ConcurrentRunSpawner {
        finished_clip: output.clone(),
        exit_code: 1,
    };
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));

    let err = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(256, 256))
        .produce_clip(&input, &output, &tube)
        .unwrap_err();
    assert!(matches!(err, CoreError::TranscodeFailed { .. }));

    assert_eq!(fs::read_to_string(&output)?, "finished by the other run");
    assert_eq!(fs::read_dir(output_dir.path())?.count(), 1, "no partial file left behind");
    Ok(())
}

#[test]
fn test_losing_a_race_keeps_the_winners_clip() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    let tube = parse_tube_line("vid_0000,720,1280,0,29,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");
    let spawner = ConcurrentRunSpawner {
        finished_clip: output.clone(),
        exit_code: 0,
    };
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));

    let outcome = ClipTranscoder::new(&spawner, &prober, SizePolicy::new(256, 256)).produce_clip(&input, &output, &tube)?;
    assert_eq!(outcome, ClipOutcome::AlreadyExists);

    assert_eq!(fs::read_to_string(&output)?, "finished by the other run");
    assert_eq!(fs::read_dir(output_dir.path())?.count(), 1, "no partial file left behind");
    Ok(())
}

#[test]
fn test_transcode_writes_partial_file_then_moves_it() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let output_dir = tempdir()?;
    create_dummy_file(input_dir.path(), "vid_0000.mp4");

    let tube = parse_tube_line("vid_0000,720,1280,0,29,0,0,640,360")?;
    let (input, output) = clip_paths(&tube, input_dir.path(), output_dir.path(), "mp4");
    let spawner = MockFfmpegSpawner::new();
    spawner.add_success_expectation("vid_0000_S0", vec![], true);
    let prober = MockFfprobeExecutor::new().with_default(probe_720p(true));

    ClipTranscoder::new(&spawner, &prober, SizePolicy::new(256, 256)).produce_clip(&input, &output, &tube)?;

    let args = spawner.get_received_calls().remove(0);
    let target = args.last().expect("output argument");
    assert!(target.ends_with(".partial.mp4"));
    assert_ne!(Path::new(target), output.as_path());
    assert!(output.exists());
    assert!(!Path::new(target).exists());
    Ok(())
}
