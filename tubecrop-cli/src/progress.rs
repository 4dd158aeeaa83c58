// ============================================================================
// tubecrop-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: indicatif bars for the long-running commands
//
// KEY COMPONENTS:
// - create_progress_bar: the shared bar style
// - TerminalObserver: PipelineObserver that drives one bar over all videos
//   and prints a one-line verdict per video

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tubecrop_core::processing::{ClipOutcome, PipelineObserver, PipelineStage, VideoOutcome, VideoReport};
use tubecrop_core::{CoreResult, TubeRecord};

/// Creates a bar with the CLI's standard style.
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    // The template is a literal; fall back to the default style if it is ever rejected.
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise})")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// One-line description of how a video ended.
pub fn describe_outcome(outcome: &VideoOutcome) -> String {
    match outcome {
        VideoOutcome::Completed { clips } => format!(
            "{} produced, {} existing, {} too small, {} missing input, {} invalid, {} failed",
            clips.produced,
            clips.already_existed,
            clips.below_minimum,
            clips.input_missing,
            clips.invalid_records,
            clips.failures.len()
        ),
        VideoOutcome::FetchFailed { reason, detail } if detail.is_empty() => format!("fetch failed: {reason}"),
        VideoOutcome::FetchFailed { reason, detail } => format!("fetch failed: {reason} ({detail})"),
        VideoOutcome::SplitFailed { message } => format!("split failed: {message}"),
        VideoOutcome::NoTubes => "no tubes for this video".to_string(),
    }
}

/// Terminal progress for the `process` command.
pub struct TerminalObserver {
    bar: ProgressBar,
    current: Mutex<Option<String>>,
    clips_total: AtomicUsize,
    clips_done: AtomicUsize,
}

impl TerminalObserver {
    pub fn new(total_videos: usize) -> Self {
        Self {
            bar: create_progress_bar(total_videos as u64, "starting"),
            current: Mutex::new(None),
            clips_total: AtomicUsize::new(0),
            clips_done: AtomicUsize::new(0),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn current_video(&self) -> String {
        self.current
            .lock()
            .map(|c| c.clone().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl PipelineObserver for TerminalObserver {
    fn video_started(&self, video_id: &str, _index: usize, _total: usize) {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(video_id.to_string());
        }
        self.bar.set_message(video_id.to_string());
    }

    fn stage_entered(&self, video_id: &str, stage: PipelineStage) {
        if stage != PipelineStage::Done {
            self.bar.set_message(format!("{video_id}: {stage}"));
        }
    }

    fn clips_started(&self, _video_id: &str, count: usize) {
        self.clips_total.store(count, Ordering::Relaxed);
        self.clips_done.store(0, Ordering::Relaxed);
    }

    fn clip_finished(&self, _tube: &TubeRecord, _result: &CoreResult<ClipOutcome>) {
        let done = self.clips_done.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.clips_total.load(Ordering::Relaxed);
        self.bar
            .set_message(format!("{}: cropping {}/{}", self.current_video(), done, total));
    }

    fn video_finished(&self, report: &VideoReport) {
        let verdict = match report.outcome {
            VideoOutcome::Completed { ref clips } if clips.failures.is_empty() => style("ok").green(),
            VideoOutcome::Completed { .. } | VideoOutcome::NoTubes => style("partial").yellow(),
            _ => style("failed").red().bold(),
        };
        self.bar.println(format!(
            "{} {} ({})",
            verdict,
            style(&report.video_id).bold(),
            describe_outcome(&report.outcome)
        ));
        self.bar.inc(1);
    }
}
