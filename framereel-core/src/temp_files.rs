//! Staged output files.
//!
//! Encodes never write their target directly. Each one writes into a hidden
//! temporary file in the target's directory, which is renamed over the target
//! only after the encoder succeeded. A rerun therefore replaces artifacts in
//! place, and a failed encode leaves whatever was there before untouched.
//! The tempfile crate deletes the staging file on drop.

use crate::error::{CoreResult, encode_failed_error};
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempPath};

/// A temporary file waiting to replace `target`.
#[derive(Debug)]
pub struct StagedOutput {
    target: PathBuf,
    temp: TempPath,
}

impl StagedOutput {
    /// Creates the staging file next to `target`, keeping its extension so
    /// ffmpeg picks the same muxer.
    pub fn new(target: &Path) -> CoreResult<Self> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let stem = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let suffix = target
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let temp = TempFileBuilder::new()
            .prefix(&format!(".{stem}."))
            .suffix(&suffix)
            .tempfile_in(&dir)?
            .into_temp_path();

        Ok(Self {
            target: target.to_path_buf(),
            temp,
        })
    }

    /// Where the encoder should write.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Moves the staged file over the target and returns its size.
    ///
    /// An empty staging file means the encoder exited cleanly without
    /// producing anything; that is reported as a failed encode for `stage`.
    pub fn commit(self, stage: &str) -> CoreResult<u64> {
        let size = std::fs::metadata(&self.temp)?.len();
        if size == 0 {
            return Err(encode_failed_error(
                stage,
                format!("encoder produced no output for {}", self.target.display()),
            ));
        }

        self.temp.persist(&self.target).map_err(|e| e.error)?;
        log::debug!("Committed {} ({} bytes)", self.target.display(), size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tempfile::tempdir;

    #[test]
    fn test_commit_replaces_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("ad-square.mp4");
        std::fs::write(&target, b"old").unwrap();

        let staged = StagedOutput::new(&target).unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));
        assert_eq!(staged.path().extension().and_then(|e| e.to_str()), Some("mp4"));
        std::fs::write(staged.path(), b"new content").unwrap();

        let size = staged.commit("square").unwrap();
        assert_eq!(size, 11);
        assert_eq!(std::fs::read(&target).unwrap(), b"new content");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_drop_keeps_previous_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("ad-main.mp4");
        std::fs::write(&target, b"previous run").unwrap();

        {
            let staged = StagedOutput::new(&target).unwrap();
            std::fs::write(staged.path(), b"partial").unwrap();
        }

        assert_eq!(std::fs::read(&target).unwrap(), b"previous run");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_empty_output_is_a_failed_encode() {
        let dir = tempdir().unwrap();
        let staged = StagedOutput::new(&dir.path().join("ad-preview.gif")).unwrap();
        let err = staged.commit("preview").unwrap_err();
        assert!(matches!(err, CoreError::EncodeFailed { ref stage, .. } if stage == "preview"));
        assert!(!dir.path().join("ad-preview.gif").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("out.mp4");
        let staged = StagedOutput::new(&target).unwrap();
        assert!(dir.path().join("nested").is_dir());
        drop(staged);
    }
}
