//! Checks that gate a pipeline run.
//!
//! Both checks are side-effect free and never error: a run either has an
//! encoder and at least one frame, or it does not start.

use crate::external::FfmpegSpawner;
use crate::frames::discover_frames;

use std::path::Path;

/// True iff the spawner's encoder binary can be invoked.
pub fn check_encoder_available<S: FfmpegSpawner>(spawner: &S) -> bool {
    let available = spawner.is_available();
    if !available {
        log::debug!("Encoder availability check failed");
    }
    available
}

/// True iff at least one file in `frames_dir` matches `pattern`.
///
/// An unreadable directory or an unparseable pattern counts as no frames.
pub fn check_frames_present(frames_dir: &Path, pattern: &str) -> bool {
    match discover_frames(frames_dir, pattern) {
        Ok(sequence) => !sequence.is_empty(),
        Err(e) => {
            log::debug!(
                "Frame check for '{pattern}' in {} failed: {e}",
                frames_dir.display()
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_frames_present() {
        let dir = tempdir().unwrap();
        assert!(!check_frames_present(dir.path(), "frame_%04d.png"));

        std::fs::write(dir.path().join("frame_0000.png"), b"png").unwrap();
        assert!(check_frames_present(dir.path(), "frame_%04d.png"));
        assert!(!check_frames_present(dir.path(), "shot_%04d.png"));
    }

    #[test]
    fn test_frames_present_ignores_near_misses() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("frame_12.png"), b"png").unwrap();
        std::fs::write(dir.path().join("frame_0001.jpg"), b"jpg").unwrap();
        std::fs::create_dir(dir.path().join("frame_0002.png")).unwrap();
        assert!(!check_frames_present(dir.path(), "frame_%04d.png"));
    }

    #[test]
    fn test_missing_directory_or_bad_pattern_is_false() {
        let dir = tempdir().unwrap();
        assert!(!check_frames_present(&dir.path().join("absent"), "frame_%04d.png"));
        assert!(!check_frames_present(dir.path(), "frame.png"));
    }
}
