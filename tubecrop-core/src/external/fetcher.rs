// ============================================================================
// tubecrop-core/src/external/fetcher.rs
// ============================================================================
//
// VIDEO FETCHER: Downloading Source Videos with yt-dlp
//
// The pipeline only needs "video id in, local file out". The VideoFetcher
// trait is that seam; YtDlpFetcher is the production implementation that
// shells out to yt-dlp and classifies its failures from stderr.
//
// KEY COMPONENTS:
// - VideoFetcher: trait for fetching a video by id
// - FailureReason / FetchFailure: classified download failures
// - YtDlpFetcher: yt-dlp backed implementation

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};
use serde::Serialize;

/// yt-dlp format selector: best mp4 video + m4a audio, then best mp4, then anything.
pub const DEFAULT_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Network and fragment retries handed to yt-dlp.
pub const DEFAULT_RETRIES: u32 = 10;

/// Watch URL for a YouTube id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Why a fetch failed. The string forms appear in download logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    RateLimit,
    Private,
    Unavailable,
    LoginRequired,
    NoFileCreated,
    Error,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::RateLimit => "RATE_LIMIT",
            FailureReason::Private => "PRIVATE",
            FailureReason::Unavailable => "UNAVAILABLE",
            FailureReason::LoginRequired => "LOGIN_REQUIRED",
            FailureReason::NoFileCreated => "NO_FILE_CREATED",
            FailureReason::Error => "ERROR",
        }
    }

    /// Classifies a downloader error message. Checked in priority order.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("rate-limited")
            || lower.contains("rate limited")
            || lower.contains("too many requests")
            || message.contains("429")
        {
            FailureReason::RateLimit
        } else if lower.contains("private video") {
            FailureReason::Private
        } else if lower.contains("unavailable") {
            FailureReason::Unavailable
        } else if lower.contains("sign in") {
            FailureReason::LoginRequired
        } else {
            FailureReason::Error
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed fetch with the downloader's last diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl FetchFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.reason, self.detail)
        }
    }
}

/// A fetched video on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedVideo {
    pub path: PathBuf,
    /// True when the file was already there and nothing was downloaded.
    pub already_present: bool,
}

/// Fetches a source video by id into a directory.
pub trait VideoFetcher {
    /// Local path of `<dest_dir>/<video_id>.<container>` once it exists.
    fn target_path(&self, video_id: &str, dest_dir: &Path) -> PathBuf;

    fn fetch(&self, video_id: &str, dest_dir: &Path) -> Result<FetchedVideo, FetchFailure>;
}

/// yt-dlp backed [`VideoFetcher`].
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary: String,
    format: String,
    container: String,
    retries: u32,
    cookies: Option<PathBuf>,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: DEFAULT_FORMAT.to_string(),
            container: crate::config::DEFAULT_CONTAINER.to_string(),
            retries: DEFAULT_RETRIES,
            cookies: None,
        }
    }
}

impl YtDlpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Cookies are only passed when the file exists.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.cookies = match cookies {
            Some(path) if path.is_file() => Some(path),
            Some(path) => {
                warn!("Cookies file {} not found, continuing without it", path.display());
                None
            }
            None => None,
        };
        self
    }

    /// Overrides the executable name, mostly for tests.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn build_args(&self, video_id: &str, output: &Path) -> Vec<String> {
        let retries = self.retries.to_string();
        let mut args: Vec<String> = vec![
            "-f".into(),
            self.format.clone(),
            "--merge-output-format".into(),
            self.container.clone(),
            "--retries".into(),
            retries.clone(),
            "--fragment-retries".into(),
            retries,
            "--quiet".into(),
            "--no-warnings".into(),
            "-o".into(),
            output.to_string_lossy().into_owned(),
        ];
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".into());
            args.push(cookies.to_string_lossy().into_owned());
        }
        args.push(watch_url(video_id));
        args
    }
}

impl VideoFetcher for YtDlpFetcher {
    fn target_path(&self, video_id: &str, dest_dir: &Path) -> PathBuf {
        dest_dir.join(format!("{video_id}.{}", self.container))
    }

    fn fetch(&self, video_id: &str, dest_dir: &Path) -> Result<FetchedVideo, FetchFailure> {
        let output = self.target_path(video_id, dest_dir);
        if output.is_file() {
            info!("File exists: {}", output.display());
            return Ok(FetchedVideo {
                path: output,
                already_present: true,
            });
        }

        std::fs::create_dir_all(dest_dir)
            .map_err(|e| FetchFailure::new(FailureReason::Error, e.to_string()))?;

        let args = self.build_args(video_id, &output);
        debug!("Running {} {}", self.binary, args.join(" "));

        let result = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FetchFailure::new(
                    FailureReason::Error,
                    format!("{} executable not found", self.binary),
                ));
            }
            Err(e) => return Err(FetchFailure::new(FailureReason::Error, e.to_string())),
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            debug!("{} stderr for {}: {}", self.binary, video_id, stderr);
            let reason = FailureReason::classify(&stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("unknown error")
                .trim()
                .to_string();
            return Err(FetchFailure::new(reason, detail));
        }

        if !output.is_file() {
            return Err(FetchFailure::new(FailureReason::NoFileCreated, ""));
        }

        info!("Downloaded: {}", output.display());
        Ok(FetchedVideo {
            path: output,
            already_present: false,
        })
    }
}
