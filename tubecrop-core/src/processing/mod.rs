//! Core processing logic and orchestration.
//!
//! Clip production, segment splitting, bounded parallel clip batches and the
//! per-video pipeline that ties them together.

/// Single clip job: preconditions, rescale, align, transcode
pub mod clip;

/// Stream-copy segment splitting
pub mod split;

/// Worker pool and batch execution of clip jobs
pub mod batch;

/// Per-video fetch -> split -> crop -> cleanup state machine
pub mod pipeline;

pub use batch::{ClipFailure, ClipReport, build_worker_pool, run_clip_jobs};
pub use clip::{ClipOutcome, ClipTranscoder, clip_paths};
pub use pipeline::{
    BatchSummary, NoopObserver, Pipeline, PipelineObserver, PipelineStage, VideoOutcome, VideoReport,
};
pub use split::{SplitSummary, split_directory, split_video};
