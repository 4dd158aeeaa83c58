//! Frame-range to audio-time alignment.
//!
//! Tube windows are expressed as inclusive frame indices. Video is trimmed by
//! frame selection while audio has to be trimmed by time, so the two are
//! derived from the same frame range and the stream frame rate.

use std::fmt;

use serde::Serialize;

/// Rate used when a stream reports no usable frame rate.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// A frame rate as reported by ffprobe, e.g. `30000/1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRate {
    pub numerator: i64,
    pub denominator: i64,
}

impl FrameRate {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Parses `num/den` or a bare integer rate. Returns `None` for anything else.
    pub fn parse(descriptor: &str) -> Option<Self> {
        let descriptor = descriptor.trim();
        match descriptor.split_once('/') {
            Some((num, den)) => Some(Self::new(
                num.trim().parse().ok()?,
                den.trim().parse().ok()?,
            )),
            None => Some(Self::new(descriptor.parse().ok()?, 1)),
        }
    }

    /// Frames per second, or [`DEFAULT_FRAME_RATE`] when the descriptor is unusable.
    pub fn as_f64(&self) -> f64 {
        if self.denominator <= 0 || self.numerator <= 0 {
            return DEFAULT_FRAME_RATE;
        }
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        // 0/0 is how ffprobe reports an unknown rate
        Self::new(0, 0)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Inclusive frame range `[start_frame, end_frame]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimWindow {
    pub start_frame: i64,
    pub end_frame: i64,
}

impl TrimWindow {
    pub fn new(start_frame: i64, end_frame: i64) -> Self {
        Self {
            start_frame,
            end_frame,
        }
    }

    pub fn frame_count(&self) -> i64 {
        self.end_frame.saturating_sub(self.start_frame).saturating_add(1)
    }

    /// ffmpeg `select` expression for the window. Commas are escaped for filtergraphs.
    pub fn select_expr(&self) -> String {
        format!(
            "select=between(n\\,{}\\,{})",
            self.start_frame, self.end_frame
        )
    }
}

/// Audio trim window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioWindow {
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

impl AudioWindow {
    /// ffmpeg `atrim` arguments for this window.
    pub fn atrim_filter(&self) -> String {
        format!(
            "atrim=start={}:duration={}",
            self.start_seconds, self.duration_seconds
        )
    }
}

/// Converts an inclusive frame window into an audio time window.
pub fn align(window: TrimWindow, frame_rate: FrameRate) -> AudioWindow {
    let fps = frame_rate.as_f64();
    AudioWindow {
        start_seconds: window.start_frame as f64 / fps,
        duration_seconds: window.frame_count() as f64 / fps,
    }
}
