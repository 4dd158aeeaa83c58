//! Temporary artifact cleanup.
//!
//! Each video leaves two kinds of temporary files behind: the fetched raw
//! file and its split segments (`<video_id>_NNNN.<container>`). Cleanup is
//! best effort; a file that cannot be removed is logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::CoreResult;

/// Files removed by a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Split segments of `video_id` in `split_dir`, sorted by name.
///
/// Matches `<video_id>_*.<container>`.
pub fn segment_files(split_dir: &Path, video_id: &str, container: &str) -> CoreResult<Vec<PathBuf>> {
    let prefix = format!("{video_id}_");
    let suffix = format!(".{container}");

    if !split_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(split_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(&suffix))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn remove_into(path: &Path, report: &mut CleanupReport) {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Deleted temporary file: {}", path.display());
            report.removed.push(path.to_path_buf());
        }
        Err(e) => {
            warn!("Failed to delete temporary file {}: {}", path.display(), e);
            report.failed.push(path.to_path_buf());
        }
    }
}

/// Removes the raw file (if present) and every split segment of `video_id`.
pub fn remove_video_artifacts(
    raw_file: Option<&Path>,
    split_dir: &Path,
    video_id: &str,
    container: &str,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    if let Some(raw) = raw_file.filter(|p| p.exists()) {
        remove_into(raw, &mut report);
    }

    match segment_files(split_dir, video_id, container) {
        Ok(files) => {
            for file in files {
                remove_into(&file, &mut report);
            }
        }
        Err(e) => warn!(
            "Could not list split segments in {}: {}",
            split_dir.display(),
            e
        ),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_raw_file_and_matching_segments_only() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("vid.mp4");
        let split = dir.path().join("split");
        fs::create_dir_all(&split).unwrap();
        fs::write(&raw, b"raw").unwrap();
        for name in ["vid_0000.mp4", "vid_0001.mp4", "vidX_0000.mp4", "vid_0000.txt"] {
            fs::write(split.join(name), b"x").unwrap();
        }

        let report = remove_video_artifacts(Some(&raw), &split, "vid", "mp4");
        assert_eq!(report.removed.len(), 3);
        assert!(report.failed.is_empty());
        assert!(!raw.exists());
        assert!(split.join("vidX_0000.mp4").exists());
        assert!(split.join("vid_0000.txt").exists());
    }

    #[test]
    fn test_missing_split_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = segment_files(&dir.path().join("nope"), "vid", "mp4").unwrap();
        assert!(files.is_empty());
        let report = remove_video_artifacts(None, &dir.path().join("nope"), "vid", "mp4");
        assert_eq!(report, CleanupReport::default());
    }
}
