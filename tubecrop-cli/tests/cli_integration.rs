use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn tubecrop_cmd() -> Command {
    Command::cargo_bin("tubecrop").expect("Failed to find tubecrop binary")
}

const TUBES: &str = "\
big_0000,1080,1920,0,29,0,0,600,600
big_0001,1080,1920,30,59,100,100,612,700
small_0000,1080,1920,0,29,0,0,300,300
this line is broken
other-id_0003,720,1280,0,29,10,10,700,600,extra
";

#[test]
fn test_filter_writes_tubes_and_ids() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("train_video_tubes.txt");
    let output = dir.path().join("big_tubes.txt");
    let ids = dir.path().join("ids.txt");
    fs::write(&input, TUBES)?;

    tubecrop_cmd()
        .arg("filter")
        .arg("--input-file")
        .arg(&input)
        .arg("--output-file")
        .arg(&output)
        .arg("--video-ids-output-file")
        .arg(&ids)
        .assert()
        .success()
        .stdout(contains("Filtered 3 tubes with size >= 512x512"))
        .stderr(contains("Line 4 has insufficient fields"));

    let kept = fs::read_to_string(&output)?;
    let kept: Vec<&str> = kept.lines().collect();
    assert_eq!(
        kept,
        vec![
            "big_0000,1080,1920,0,29,0,0,600,600",
            "big_0001,1080,1920,30,59,100,100,612,700",
            "other-id_0003,720,1280,0,29,10,10,700,600",
        ]
    );

    let ids = fs::read_to_string(&ids)?;
    assert_eq!(ids.lines().collect::<Vec<_>>(), vec!["big", "other-id"]);
    Ok(())
}

#[test]
fn test_filter_default_id_list_location() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("tubes.txt");
    fs::write(&input, TUBES)?;

    tubecrop_cmd()
        .arg("filter")
        .arg("--input-file")
        .arg(&input)
        .arg("--output-file")
        .arg(dir.path().join("out.txt"))
        .arg("--min-width")
        .arg("200")
        .arg("--min-height")
        .arg("200")
        .assert()
        .success()
        .stdout(contains("Filtered 4 tubes with size >= 200x200"));

    let ids = fs::read_to_string(dir.path().join("train_video_ids_200x200.txt"))?;
    assert_eq!(ids.lines().collect::<Vec<_>>(), vec!["big", "other-id", "small"]);
    Ok(())
}

#[test]
fn test_filter_missing_input_is_fatal() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    tubecrop_cmd()
        .arg("filter")
        .arg("--input-file")
        .arg(dir.path().join("absent.txt"))
        .arg("--output-file")
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(contains("Tube metadata is unavailable"));

    assert!(!dir.path().join("out.txt").exists());
    Ok(())
}

#[test]
fn test_filter_writes_log_file_when_requested() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("tubes.txt");
    let logs = dir.path().join("logs");
    fs::write(&input, TUBES)?;

    tubecrop_cmd()
        .arg("filter")
        .arg("--input-file")
        .arg(&input)
        .arg("--output-file")
        .arg(dir.path().join("out.txt"))
        .arg("--log-dir")
        .arg(&logs)
        .assert()
        .success();

    let entries: Vec<_> = fs::read_dir(&logs)?.filter_map(|e| e.ok()).collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("tubecrop_filter_"), "unexpected log file {name}");
    let content = fs::read_to_string(entries[0].path())?;
    assert!(content.contains("Filtered 3 tubes"));
    Ok(())
}

#[test]
fn test_process_requires_ids_file() -> Result<(), Box<dyn Error>> {
    tubecrop_cmd()
        .arg("process")
        .arg("--tubes-file")
        .arg("tubes.txt")
        .arg("--output-dir")
        .arg("clips")
        .assert()
        .failure()
        .stderr(contains("--video-ids-file"));
    Ok(())
}

#[test]
fn test_process_missing_id_list_is_fatal() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    tubecrop_cmd()
        .arg("process")
        .arg("--video-ids-file")
        .arg(dir.path().join("absent_ids.txt"))
        .arg("--tubes-file")
        .arg(dir.path().join("tubes.txt"))
        .arg("--output-dir")
        .arg(dir.path().join("clips"))
        .assert()
        .failure()
        .stderr(contains("absent_ids.txt"));
    Ok(())
}

#[test]
fn test_invalid_numeric_argument() -> Result<(), Box<dyn Error>> {
    tubecrop_cmd()
        .arg("crop")
        .arg("--input-dir")
        .arg("segments")
        .arg("--clip-info-file")
        .arg("tubes.txt")
        .arg("--output-dir")
        .arg("clips")
        .arg("--num-workers")
        .arg("many")
        .assert()
        .failure()
        .stderr(contains("invalid value 'many'"));
    Ok(())
}

#[test]
fn test_help_lists_subcommands() -> Result<(), Box<dyn Error>> {
    tubecrop_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("process"))
        .stdout(contains("crop"))
        .stdout(contains("split"))
        .stdout(contains("download"))
        .stdout(contains("filter"));
    Ok(())
}
