// framereel-cli/tests/cli_integration.rs
//
// End-to-end runs of the `framereel` binary. The unix tests put a shell
// script in place of ffmpeg so no real encoder is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn framereel() -> Command {
    let mut cmd = Command::cargo_bin("framereel").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("FRAMEREEL_FFMPEG");
    cmd
}

fn write_frames(dir: &Path, count: u32) {
    for i in 0..count {
        std::fs::write(dir.join(format!("frame_{i:04}.png")), b"png").unwrap();
    }
}

/// Stand-in encoder: answers `-version`, fails the widescreen derivation,
/// and writes a few bytes to the output path for everything else.
#[cfg(unix)]
fn fake_ffmpeg(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-ffmpeg");
    std::fs::write(
        &script,
        r#"#!/bin/sh
for last; do :; done
case "$*" in
  *-version*) exit 0 ;;
  *pad=1280:720*) echo "widescreen filter exploded" >&2; exit 1 ;;
esac
printf 'fake' > "$last"
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[test]
fn test_help_lists_options() {
    framereel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--fps"))
        .stdout(predicate::str::contains("--no-preview"));
}

#[test]
fn test_zero_fps_is_rejected() {
    framereel().args(["--fps", "0"]).assert().code(1);
}

#[test]
fn test_missing_encoder_exits_with_guidance() {
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_frames(frames.path(), 3);

    framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .args(["--ffmpeg", "/definitely/not/here/ffmpeg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Encoder not available"))
        .stderr(predicate::str::contains("Install ffmpeg"));

    assert!(!out.path().join("ad-main.mp4").exists());
}

#[cfg(unix)]
#[test]
fn test_missing_frames_exits_with_guidance() {
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();

    framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .args(["--ffmpeg", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No frames found"))
        .stderr(predicate::str::contains("Export the PNG frame sequence"));
}

#[cfg(unix)]
#[test]
fn test_partial_failure_still_exits_zero() {
    let tools = tempdir().unwrap();
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_frames(frames.path(), 12);
    let ffmpeg = fake_ffmpeg(tools.path());

    framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--no-verify")
        .assert()
        .success()
        .stderr(predicate::str::contains("widescreen"))
        .stderr(predicate::str::contains("FAILED"));

    for name in ["ad-main.mp4", "ad-square.mp4", "ad-vertical.mp4", "ad-preview.gif"] {
        assert!(out.path().join(name).exists(), "{name} missing");
    }
    assert!(!out.path().join("ad-widescreen.mp4").exists());
}

#[cfg(unix)]
#[test]
fn test_json_mode_streams_events() {
    let tools = tempdir().unwrap();
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_frames(frames.path(), 6);
    let ffmpeg = fake_ffmpeg(tools.path());

    let assert = framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .args(["--no-verify", "--no-preview", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events[0]["type"], "state_changed");
    let finished = events.last().unwrap();
    assert_eq!(finished["type"], "pipeline_finished");
    assert_eq!(finished["succeeded"], 3);
    assert_eq!(finished["failed"], 1);
}

#[cfg(unix)]
#[test]
fn test_report_file_lists_every_variant() {
    let tools = tempdir().unwrap();
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_frames(frames.path(), 6);
    let ffmpeg = fake_ffmpeg(tools.path());
    let report = out.path().join("report.json");

    framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--no-verify")
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    let variants = json["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 3);
    assert_eq!(json["primary"]["frame_count"], 6);
}

#[cfg(unix)]
#[test]
fn test_json_mode_with_log_dir_keeps_stdout_clean() {
    let tools = tempdir().unwrap();
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();
    let logs = tempdir().unwrap();
    write_frames(frames.path(), 6);
    let ffmpeg = fake_ffmpeg(tools.path());

    let assert = framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .args(["--no-verify", "--json", "-l"])
        .arg(logs.path())
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(!stdout.trim().is_empty());
    for line in stdout.lines() {
        assert!(
            serde_json::from_str::<serde_json::Value>(line).is_ok(),
            "non-JSON line on stdout: {line}"
        );
    }

    let log_files: Vec<_> = std::fs::read_dir(logs.path()).unwrap().collect();
    assert_eq!(log_files.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unwritable_report_does_not_fail_the_run() {
    let tools = tempdir().unwrap();
    let frames = tempdir().unwrap();
    let out = tempdir().unwrap();
    write_frames(frames.path(), 6);
    let ffmpeg = fake_ffmpeg(tools.path());

    // A directory cannot be opened as the report file
    framereel()
        .arg("--frames-dir")
        .arg(frames.path())
        .arg("--output-dir")
        .arg(out.path())
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--no-verify")
        .arg("--report")
        .arg(out.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not write report"))
        .stderr(predicate::str::contains("SUMMARY"));

    assert!(out.path().join("ad-main.mp4").exists());
}
