// ============================================================================
// tubecrop-core/src/tubes/mod.rs
// ============================================================================
//
// TUBE METADATA: Parsing Tube Records
//
// A tube is one spatio-temporal crop instruction: a segment identifier, the
// reference resolution the box was drawn against, an inclusive frame range and
// a pixel box. Tube files hold one comma-separated record per line:
//
//   <segment_id>, <H>, <W>, <S>, <E>, <L>, <T>, <R>, <B>
//
// Bad lines are never fatal. The loader logs a warning with the 1-based line
// number and a short preview, then moves on.
//
// KEY COMPONENTS:
// - TubeRecord: one parsed line
// - parse_tube_line: single-line parser
// - read_tubes / load_tubes: whole-file loaders that skip bad lines
// - TubeIndex (index.rs): per-video lookup
// - filter (filter.rs): reference-space size filtering

pub mod filter;
pub mod index;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::geometry::{CropBox, Resolution};
use crate::timing::TrimWindow;
use crate::utils::preview;

pub use filter::{FilterOutcome, filter_by_size};
pub use index::TubeIndex;

/// Minimum number of comma-separated fields in a tube line.
pub const TUBE_FIELD_COUNT: usize = 9;

/// Number of characters of a bad line shown in warnings.
pub const PREVIEW_CHARS: usize = 50;

const NUMERIC_FIELDS: [&str; 8] = ["H", "W", "S", "E", "L", "T", "R", "B"];

/// One parsed tube line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TubeRecord {
    pub segment_id: String,
    pub reference_height: i64,
    pub reference_width: i64,
    pub start_frame: i64,
    pub end_frame: i64,
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl TubeRecord {
    /// Parent video identifier (segment id without its last `_<suffix>`).
    pub fn video_id(&self) -> &str {
        video_id_of(&self.segment_id)
    }

    pub fn reference(&self) -> Resolution {
        Resolution::new(self.reference_height, self.reference_width)
    }

    pub fn crop_box(&self) -> CropBox {
        CropBox::new(self.left, self.top, self.right, self.bottom)
    }

    pub fn trim_window(&self) -> TrimWindow {
        TrimWindow::new(self.start_frame, self.end_frame)
    }

    /// Deterministic clip file name, e.g. `abc_0001_S10_E20_L1_T2_R3_B4.mp4`.
    ///
    /// Coordinates are the reference-space values from the record, so the
    /// name is stable regardless of the actual resolution of the segment.
    pub fn clip_file_name(&self, container: &str) -> String {
        format!(
            "{}_S{}_E{}_L{}_T{}_R{}_B{}.{}",
            self.segment_id,
            self.start_frame,
            self.end_frame,
            self.left,
            self.top,
            self.right,
            self.bottom,
            container
        )
    }

    /// Name of the split segment this tube reads from.
    pub fn segment_file_name(&self, container: &str) -> String {
        format!("{}.{}", self.segment_id, container)
    }
}

impl fmt::Display for TubeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{}",
            self.segment_id,
            self.reference_height,
            self.reference_width,
            self.start_frame,
            self.end_frame,
            self.left,
            self.top,
            self.right,
            self.bottom
        )
    }
}

/// Strips the final `_<suffix>` from a segment id.
///
/// Only the last underscore is significant, so ids that themselves contain
/// underscores or dashes survive intact. A string without an underscore is
/// returned unchanged.
pub fn video_id_of(segment_id: &str) -> &str {
    segment_id
        .rsplit_once('_')
        .map_or(segment_id, |(video_id, _)| video_id)
}

/// Parses one tube line. Fields beyond the ninth are ignored.
///
/// The frame range is inclusive, so `S == E` is a one-frame tube; `S > E`
/// is rejected as an invalid end frame.
pub fn parse_tube_line(line: &str) -> CoreResult<TubeRecord> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < TUBE_FIELD_COUNT {
        return Err(CoreError::MalformedRecord { found: parts.len() });
    }

    let mut values = [0i64; 8];
    for (slot, (name, raw)) in values
        .iter_mut()
        .zip(NUMERIC_FIELDS.iter().zip(&parts[1..TUBE_FIELD_COUNT]))
    {
        let raw = raw.trim();
        *slot = raw.parse().map_err(|_| CoreError::InvalidNumeric {
            field: *name,
            value: raw.to_string(),
        })?;
    }
    let [h, w, s, e, l, t, r, b] = values;
    if s > e {
        return Err(CoreError::InvalidNumeric {
            field: "E",
            value: format!("{e} (before start frame {s})"),
        });
    }

    Ok(TubeRecord {
        segment_id: parts[0].trim().to_string(),
        reference_height: h,
        reference_width: w,
        start_frame: s,
        end_frame: e,
        left: l,
        top: t,
        right: r,
        bottom: b,
    })
}

/// A line the loader could not parse.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub preview: String,
    pub reason: String,
}

/// Result of loading a tube file.
#[derive(Debug, Clone, Default)]
pub struct TubeSet {
    pub records: Vec<TubeRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Parses every line of `reader`, skipping blank and invalid lines.
pub fn read_tubes<R: BufRead>(reader: R) -> CoreResult<TubeSet> {
    let mut set = TubeSet::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_tube_line(line) {
            Ok(record) => set.records.push(record),
            Err(e) => {
                let kind = match e {
                    CoreError::MalformedRecord { .. } => "has insufficient fields",
                    _ => "has invalid numeric values",
                };
                let shown = preview(line, PREVIEW_CHARS);
                warn!("Line {} {}, skipping: {}", line_number, kind, shown);
                debug!("Line {} parse error: {}", line_number, e);
                set.skipped.push(SkippedLine {
                    line_number,
                    preview: shown.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(set)
}

/// Loads a tube file from disk.
///
/// A missing file is the one fatal input condition and is reported as
/// [`CoreError::MetadataUnavailable`].
pub fn load_tubes(path: &Path) -> CoreResult<TubeSet> {
    let file = File::open(path).map_err(|e| {
        debug!("Cannot open tube file {}: {}", path.display(), e);
        CoreError::MetadataUnavailable(PathBuf::from(path))
    })?;
    let set = read_tubes(BufReader::new(file))?;
    debug!(
        "Loaded {} tube records from {} ({} skipped)",
        set.records.len(),
        path.display(),
        set.skipped.len()
    );
    Ok(set)
}
