//! JSON run reports.
//!
//! Every long-running command can leave a machine-readable record of what it
//! did next to its log file, so failed videos and clips can be retried by hand.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use serde_json::json;

use crate::error::CoreResult;

/// `tubecrop_<command>_<YYYYMMDD_HHMMSS>.json`
pub fn report_file_name(command: &str) -> String {
    format!("tubecrop_{}_{}.json", command, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Writes `report` wrapped with tool metadata into `dir` and returns the path.
pub fn write_run_report<T: Serialize>(dir: &Path, command: &str, report: &T) -> CoreResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(command));

    let document = json!({
        "tool": "tubecrop",
        "version": env!("CARGO_PKG_VERSION"),
        "command": command,
        "generated_at": Local::now().to_rfc3339(),
        "report": report,
    });

    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, &document)?;
    log::debug!("Run report written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        produced: usize,
    }

    #[test]
    fn test_report_is_valid_json_with_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_run_report(dir.path(), "process", &Sample { produced: 3 }).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("tubecrop_process_"));

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["command"], "process");
        assert_eq!(value["report"]["produced"], 3);
    }
}
