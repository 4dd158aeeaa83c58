// ============================================================================
// tubecrop-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Tube Crop Pipeline
//
// Record-level errors (MalformedRecord, InvalidNumeric, DivisionByZero,
// CoordinateOutOfRange) are always recoverable: the caller skips the record
// with a warning and continues. Job and
// stage errors (InputMissing, FetchFailed, SplitFailed, TranscodeFailed) are
// recoverable at the batch level by skipping the affected unit. Only the
// absence of the input metadata, a missing external dependency or an invalid
// configuration are fatal, and those are detected before any work starts.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::external::fetcher::FetchFailure;

/// Errors produced by the tubecrop core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ---- Record-level ----
    #[error("Malformed tube record: expected at least 9 fields, found {found}")]
    MalformedRecord { found: usize },

    #[error("Invalid numeric value for field '{field}': '{value}'")]
    InvalidNumeric { field: &'static str, value: String },

    #[error("Reference resolution has a zero dimension ({height}x{width})")]
    DivisionByZero { height: i64, width: i64 },

    #[error("Coordinate '{field}' = {value} cannot be rescaled without overflow")]
    CoordinateOutOfRange { field: &'static str, value: i64 },

    // ---- Job-level ----
    #[error("Input file does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("Transcode failed for {}: {message}", .output.display())]
    TranscodeFailed { output: PathBuf, message: String },

    // ---- Stage-level ----
    #[error("Fetch failed for {video_id}: {reason}")]
    FetchFailed {
        video_id: String,
        reason: FetchFailure,
    },

    #[error("Split failed for {video_id}: {message}")]
    SplitFailed { video_id: String, message: String },

    // ---- Fatal / infrastructure ----
    #[error("Tube metadata is unavailable: {}", .0.display())]
    MetadataUnavailable(PathBuf),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, std::io::Error),

    #[error("{0} exited with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Failed to probe media: {0}")]
    ProbeFailed(String),

    #[error("No video stream in {}", .0.display())]
    NoVideoStream(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for tubecrop core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// True for errors confined to a single tube record.
    ///
    /// Clip batches count these as skipped records rather than failed jobs.
    #[must_use]
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedRecord { .. }
                | CoreError::InvalidNumeric { .. }
                | CoreError::DivisionByZero { .. }
                | CoreError::CoordinateOutOfRange { .. }
        )
    }
}

pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}
