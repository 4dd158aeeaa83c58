//! Per-video lookup over loaded tube records.

use std::collections::BTreeSet;
use std::path::Path;

use super::{TubeRecord, load_tubes};
use crate::error::CoreResult;

/// All tube records of one metadata file, queried by video id.
///
/// Lookups are a linear scan in file order. Runs process videos one at a
/// time, so the scan cost stays small next to the transcodes it feeds.
#[derive(Debug, Clone, Default)]
pub struct TubeIndex {
    records: Vec<TubeRecord>,
}

impl TubeIndex {
    pub fn new(records: Vec<TubeRecord>) -> Self {
        Self { records }
    }

    /// Loads and indexes a tube file, skipping bad lines.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        Ok(Self::new(load_tubes(path)?.records))
    }

    /// Records whose segment id starts with `video_id` followed by `_`.
    ///
    /// The trailing underscore keeps `videoA` from matching `videoAB_0000`.
    pub fn tubes_for(&self, video_id: &str) -> Vec<&TubeRecord> {
        let prefix = format!("{video_id}_");
        self.records
            .iter()
            .filter(|r| r.segment_id.starts_with(&prefix))
            .collect()
    }

    /// Distinct parent video ids, sorted.
    pub fn video_ids(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.video_id().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn records(&self) -> &[TubeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
