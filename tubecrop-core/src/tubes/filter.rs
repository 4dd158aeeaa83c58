//! Reference-space size filtering of tube records.
//!
//! Used to build training subsets ahead of any download: a tube survives when
//! its box, measured in its own reference resolution, is at least the
//! requested size.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::TubeRecord;
use crate::geometry::SizePolicy;

/// Default minimum box size for the filter.
pub const DEFAULT_FILTER_MIN_SIZE: i64 = 512;

/// Tubes that passed the filter and the sorted set of their video ids.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome<'a> {
    pub kept: Vec<&'a TubeRecord>,
    pub video_ids: Vec<String>,
}

/// Keeps records whose reference box is at least `policy` in both dimensions.
pub fn filter_by_size(records: &[TubeRecord], policy: SizePolicy) -> FilterOutcome<'_> {
    let kept: Vec<&TubeRecord> = records
        .iter()
        .filter(|r| {
            let b = r.crop_box();
            b.width() >= policy.min_width && b.height() >= policy.min_height
        })
        .collect();

    let video_ids = kept
        .iter()
        .map(|r| r.video_id().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    FilterOutcome { kept, video_ids }
}

/// `<input dir>/train_video_ids_<W>x<H>.txt`
pub fn default_id_list_path(input_file: &Path, policy: SizePolicy) -> PathBuf {
    let dir = input_file.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!(
        "train_video_ids_{}x{}.txt",
        policy.min_width, policy.min_height
    ))
}
