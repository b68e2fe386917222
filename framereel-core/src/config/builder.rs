// ============================================================================
// framereel-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PipelineConfig
//
// Fluent construction of PipelineConfig. Every field starts at its default,
// so callers only set what differs from the standard frame export layout.

use std::path::PathBuf;

use super::PipelineConfig;

/// Builder for creating PipelineConfig instances.
///
/// # Examples
///
/// ```rust
/// use framereel_core::config::PipelineConfigBuilder;
///
/// let config = PipelineConfigBuilder::new()
///     .frame_pattern("shot_%03d.png")
///     .primary_output("launch.mp4")
///     .generate_preview(false)
///     .build();
/// assert_eq!(config.frame_pattern, "shot_%03d.png");
/// assert!(!config.generate_preview);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames_dir(mut self, dir: PathBuf) -> Self {
        self.config.frames_dir = dir;
        self
    }

    #[must_use]
    pub fn frame_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.frame_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = dir;
        self
    }

    /// Sets the primary artifact path (relative paths land in the output dir).
    #[must_use]
    pub fn primary_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.primary_output = path.into();
        self
    }

    #[must_use]
    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    #[must_use]
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = path.into();
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    #[must_use]
    pub fn generate_preview(mut self, enabled: bool) -> Self {
        self.config.generate_preview = enabled;
        self
    }

    #[must_use]
    pub fn verify_outputs(mut self, enabled: bool) -> Self {
        self.config.verify_outputs = enabled;
        self
    }

    /// Builds the PipelineConfig. Call [`PipelineConfig::validate`] before use.
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FPS, DEFAULT_FRAME_PATTERN};

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfigBuilder::new().build();
        assert_eq!(config.fps, DEFAULT_FPS);
        assert_eq!(config.frame_pattern, DEFAULT_FRAME_PATTERN);
        assert!(config.generate_preview);
        assert!(config.verify_outputs);
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder_overrides() {
        let config = PipelineConfigBuilder::new()
            .frames_dir(PathBuf::from("frames"))
            .output_dir(PathBuf::from("dist"))
            .primary_output("main.mp4")
            .ffmpeg_path("/opt/ffmpeg/bin/ffmpeg")
            .fps(24)
            .verify_outputs(false)
            .build();

        assert_eq!(config.frames_dir, PathBuf::from("frames"));
        assert_eq!(config.primary_path(), PathBuf::from("dist/main.mp4"));
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.fps, 24);
        assert!(!config.verify_outputs);
    }
}
