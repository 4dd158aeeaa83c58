// ============================================================================
// tubecrop-core/src/download.rs
// ============================================================================
//
// DOWNLOAD SESSION: Sequential, Polite Bulk Fetching
//
// Downloads a list of video ids one at a time. Before each real download the
// session sleeps for a random interval, and after a rate-limit failure it
// backs off for several minutes before the next id. Every step is appended to
// a tab-separated log so interrupted sessions can be inspected and resumed:
//
//   START   <id>  <url>
//   OK      <id>  <path>
//   EXISTS  <id>  <path>
//   FAIL    <id>  <reason>  <detail>
//   SUMMARY OK=<n> EXISTS=<n> FAIL=<n> TOTAL=<n> ELAPSED=<secs>s

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use crate::error::CoreResult;
use crate::external::fetcher::{FailureReason, VideoFetcher, watch_url};

pub const DEFAULT_SLEEP_MIN_SECS: f64 = 5.0;
pub const DEFAULT_SLEEP_MAX_SECS: f64 = 15.0;
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(300);

/// Pacing and logging options for a download session.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub sleep_min_secs: f64,
    pub sleep_max_secs: f64,
    pub rate_limit_backoff: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            sleep_min_secs: DEFAULT_SLEEP_MIN_SECS,
            sleep_max_secs: DEFAULT_SLEEP_MAX_SECS,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            log_file: None,
        }
    }
}

impl DownloadOptions {
    /// Random delay in `[min, max]`, or zero when `max` is not positive.
    pub fn jitter(&self) -> Duration {
        if self.sleep_max_secs <= 0.0 {
            return Duration::ZERO;
        }
        let max = self.sleep_max_secs;
        let min = self.sleep_min_secs.clamp(0.0, max);
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..=max))
    }
}

/// What happened to one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadStatus {
    Ok,
    Exists,
    Failed { reason: FailureReason, detail: String },
}

/// Session totals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    pub ok: usize,
    pub exists: usize,
    pub failed: usize,
    pub total: usize,
    pub elapsed_secs: f64,
}

impl DownloadSummary {
    pub fn log_line(&self) -> String {
        format!(
            "SUMMARY\tOK={}\tEXISTS={}\tFAIL={}\tTOTAL={}\tELAPSED={:.2}s",
            self.ok, self.exists, self.failed, self.total, self.elapsed_secs
        )
    }
}

/// Append-only session log. Write errors are logged, never fatal.
struct SessionLog {
    file: Option<File>,
}

impl SessionLog {
    fn open(path: Option<&Path>) -> Self {
        let file = path.and_then(|p| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .map_err(|e| warn!("Cannot open download log {}: {}", p.display(), e))
                .ok()
        });
        Self { file }
    }

    fn line(&mut self, text: &str) {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = writeln!(file, "{text}") {
                warn!("Failed to write download log: {}", e);
            }
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}

/// Downloads `video_ids` into `output_dir` one after another.
///
/// `on_item` is called after each id with its 0-based position and status.
pub fn download_all<F, C>(
    fetcher: &F,
    video_ids: &[String],
    output_dir: &Path,
    options: &DownloadOptions,
    mut on_item: C,
) -> CoreResult<DownloadSummary>
where
    F: VideoFetcher,
    C: FnMut(usize, &str, &DownloadStatus),
{
    std::fs::create_dir_all(output_dir)?;
    let mut log = SessionLog::open(options.log_file.as_deref());
    log.line(&format!(
        "# START DOWNLOAD | output_dir={} | {}",
        output_dir.display(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    let start = Instant::now();
    let mut summary = DownloadSummary {
        total: video_ids.len(),
        ..DownloadSummary::default()
    };

    for (i, video_id) in video_ids.iter().enumerate() {
        info!("[{}/{}] Processing {}...", i + 1, video_ids.len(), video_id);

        let target = fetcher.target_path(video_id, output_dir);
        let status = if target.is_file() {
            let msg = format!("EXISTS\t{}\t{}", video_id, target.display());
            info!("{}", msg);
            log.line(&msg);
            DownloadStatus::Exists
        } else {
            let delay = options.jitter();
            if !delay.is_zero() {
                info!("Sleeping for {:.2} seconds...", delay.as_secs_f64());
                pause(delay);
            }

            log.line(&format!("START\t{}\t{}", video_id, watch_url(video_id)));
            match fetcher.fetch(video_id, output_dir) {
                Ok(fetched) => {
                    let msg = format!("OK\t{}\t{}", video_id, fetched.path.display());
                    info!("{}", msg);
                    log.line(&msg);
                    DownloadStatus::Ok
                }
                Err(failure) => {
                    let msg = if failure.detail.is_empty() {
                        format!("FAIL\t{}\t{}", video_id, failure.reason)
                    } else {
                        format!("FAIL\t{}\t{}\t{}", video_id, failure.reason, failure.detail)
                    };
                    warn!("{}", msg);
                    log.line(&msg);

                    if failure.reason == FailureReason::RateLimit {
                        warn!(
                            "Rate limit detected, sleeping for {}s before the next video",
                            options.rate_limit_backoff.as_secs()
                        );
                        pause(options.rate_limit_backoff);
                    }
                    DownloadStatus::Failed {
                        reason: failure.reason,
                        detail: failure.detail,
                    }
                }
            }
        };

        match status {
            DownloadStatus::Ok => summary.ok += 1,
            DownloadStatus::Exists => summary.exists += 1,
            DownloadStatus::Failed { .. } => summary.failed += 1,
        }
        on_item(i, video_id, &status);
    }

    summary.elapsed_secs = start.elapsed().as_secs_f64();
    let line = summary.log_line();
    info!("{}", line);
    log.line(&line);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_bounds() {
        let opts = DownloadOptions {
            sleep_min_secs: 0.01,
            sleep_max_secs: 0.02,
            ..DownloadOptions::default()
        };
        for _ in 0..50 {
            let d = opts.jitter().as_secs_f64();
            assert!((0.01..=0.02).contains(&d));
        }

        let off = DownloadOptions {
            sleep_max_secs: 0.0,
            ..DownloadOptions::default()
        };
        assert_eq!(off.jitter(), Duration::ZERO);
    }

    #[test]
    fn test_summary_line_format() {
        let s = DownloadSummary {
            ok: 2,
            exists: 1,
            failed: 3,
            total: 6,
            elapsed_secs: 12.345,
        };
        assert_eq!(s.log_line(), "SUMMARY\tOK=2\tEXISTS=1\tFAIL=3\tTOTAL=6\tELAPSED=12.35s");
    }
}
