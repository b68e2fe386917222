//! Configuration structures and constants for the framereel-core library.
//!
//! The encoding profiles themselves are fixed (see [`crate::profiles`]); this
//! module only covers where frames are read from, where artifacts go, the
//! input frame rate, and which optional stages run.

mod builder;

use crate::error::{CoreError, CoreResult};
use crate::frames::FramePattern;
use crate::profiles::VARIANT_PROFILES;
use std::path::PathBuf;

pub use builder::PipelineConfigBuilder;

// Default constants

/// Default printf-style template for exported frames.
pub const DEFAULT_FRAME_PATTERN: &str = "frame_%04d.png";

/// Default file name of the primary artifact.
pub const DEFAULT_PRIMARY_OUTPUT: &str = "ad-main.mp4";

/// Default input frame rate. The primary inherits it.
pub const DEFAULT_FPS: u32 = 60;

/// Highest frame rate accepted on the command line.
pub const MAX_FPS: u32 = 240;

/// Default encoder executable, resolved through `PATH`.
pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

/// Frame rate the preview is resampled to.
pub const PREVIEW_FPS: u32 = 15;

/// Width of the preview in pixels; height follows the aspect ratio.
pub const PREVIEW_WIDTH: u32 = 480;

/// Fixed file name of the preview artifact.
pub const PREVIEW_FILENAME: &str = "ad-preview.gif";

/// Main configuration structure for a pipeline run.
///
/// All fields have defaults matching the exported frame layout, so a run in
/// the frames directory needs no configuration at all.
///
/// # Examples
///
/// ```rust
/// use framereel_core::config::PipelineConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = PipelineConfigBuilder::new()
///     .frames_dir(PathBuf::from("export"))
///     .output_dir(PathBuf::from("out"))
///     .fps(30)
///     .parallel(true)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the exported frames
    pub frames_dir: PathBuf,

    /// printf-style frame template, e.g. `frame_%04d.png`
    pub frame_pattern: String,

    /// Directory receiving the variants and the preview
    pub output_dir: PathBuf,

    /// Primary artifact path; relative paths resolve against `output_dir`
    pub primary_output: PathBuf,

    /// Input frame rate
    pub fps: u32,

    /// Encoder executable
    pub ffmpeg_path: PathBuf,

    /// Run variants concurrently with each other and with the preview
    pub parallel: bool,

    /// Whether the preview stage runs at all
    pub generate_preview: bool,

    /// Probe finished artifacts and check their dimensions
    pub verify_outputs: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("."),
            frame_pattern: DEFAULT_FRAME_PATTERN.to_string(),
            output_dir: PathBuf::from("."),
            primary_output: PathBuf::from(DEFAULT_PRIMARY_OUTPUT),
            fps: DEFAULT_FPS,
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_BINARY),
            parallel: false,
            generate_preview: true,
            verify_outputs: true,
        }
    }
}

impl PipelineConfig {
    /// Resolved location of the primary artifact.
    #[must_use]
    pub fn primary_path(&self) -> PathBuf {
        if self.primary_output.is_absolute() {
            self.primary_output.clone()
        } else {
            self.output_dir.join(&self.primary_output)
        }
    }

    /// Resolved location of the preview artifact.
    #[must_use]
    pub fn preview_path(&self) -> PathBuf {
        self.output_dir.join(PREVIEW_FILENAME)
    }

    /// Checks the values a run depends on before anything is spawned.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(CoreError::Config(format!(
                "fps must be between 1 and {MAX_FPS}, got {}",
                self.fps
            )));
        }

        if self.ffmpeg_path.as_os_str().is_empty() {
            return Err(CoreError::Config("ffmpeg path must not be empty".to_string()));
        }

        if self.primary_output.file_name().is_none() {
            return Err(CoreError::Config(format!(
                "primary output '{}' has no file name",
                self.primary_output.display()
            )));
        }

        // Derivations read the primary, so nothing may be written over it
        let primary = self.primary_path();
        let clash = VARIANT_PROFILES
            .iter()
            .map(|p| self.output_dir.join(p.filename))
            .chain(std::iter::once(self.preview_path()))
            .find(|path| *path == primary);
        if let Some(clash) = clash {
            return Err(CoreError::Config(format!(
                "primary output '{}' would be overwritten by a derived artifact",
                clash.display()
            )));
        }

        FramePattern::parse(&self.frame_pattern)?;
        Ok(())
    }
}
