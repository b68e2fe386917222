//! FFmpeg command builder utilities
//!
//! Every stage starts from the same base command (banner hidden, outputs
//! overwritten) and composes its video filters through [`VideoFilterChain`].

use ffmpeg_sidecar::command::FfmpegCommand;

/// Builder for creating `FFmpeg` commands with common configurations
pub struct FfmpegCommandBuilder {
    cmd: FfmpegCommand,
}

impl FfmpegCommandBuilder {
    /// Creates a builder on top of an existing command, typically one
    /// obtained from [`crate::external::FfmpegSpawner::new_command`]
    #[must_use]
    pub fn from_command(cmd: FfmpegCommand) -> Self {
        Self { cmd }
    }

    /// Builds the command with the banner hidden and overwriting enabled
    #[must_use]
    pub fn build(mut self) -> FfmpegCommand {
        self.cmd.hide_banner();
        self.cmd.overwrite();
        self.cmd
    }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scales down to fit within `width`x`height`, keeping the aspect ratio
    #[must_use]
    pub fn add_fit_within(mut self, width: u32, height: u32) -> Self {
        self.filters.push(format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease"
        ));
        self
    }

    /// Pads to exactly `width`x`height`, centred on both axes
    #[must_use]
    pub fn add_letterbox(mut self, width: u32, height: u32, color: &str) -> Self {
        self.filters.push(format!(
            "pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:{color}"
        ));
        self
    }

    /// Resamples to a fixed frame rate
    #[must_use]
    pub fn add_fps(mut self, fps: u32) -> Self {
        self.filters.push(format!("fps={fps}"));
        self
    }

    /// Scales to a fixed width, deriving the height from the aspect ratio
    #[must_use]
    pub fn add_scale_width(mut self, width: u32, flags: &str) -> Self {
        if flags.is_empty() {
            self.filters.push(format!("scale={width}:-1"));
        } else {
            self.filters.push(format!("scale={width}:-1:flags={flags}"));
        }
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Returns the arguments of a command as owned strings.
pub fn command_args(cmd: &mut FfmpegCommand) -> Vec<String> {
    cmd.as_inner()
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

/// Renders a command as a single shell-like line for logging.
pub fn command_line(cmd: &mut FfmpegCommand) -> String {
    let program = cmd.as_inner().get_program().to_string_lossy().into_owned();
    let mut line = program;
    for arg in command_args(cmd) {
        line.push(' ');
        if arg.contains(' ') {
            line.push('"');
            line.push_str(&arg);
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_letterbox_chain() {
        let chain = VideoFilterChain::new()
            .add_fit_within(1080, 1920)
            .add_letterbox(1080, 1920, "black")
            .build();
        assert_eq!(
            chain.as_deref(),
            Some(
                "scale=1080:1920:force_original_aspect_ratio=decrease,\
                 pad=1080:1920:(ow-iw)/2:(oh-ih)/2:black"
            )
        );
    }

    #[test]
    fn test_preview_chain() {
        let chain = VideoFilterChain::new()
            .add_fps(15)
            .add_scale_width(480, "lanczos")
            .build();
        assert_eq!(chain.as_deref(), Some("fps=15,scale=480:-1:flags=lanczos"));
    }

    #[test]
    fn test_empty_chain() {
        assert!(VideoFilterChain::new().build().is_none());
    }

    #[test]
    fn test_builder_base_args() {
        let mut cmd = FfmpegCommandBuilder::from_command(FfmpegCommand::new_with_path("ffmpeg")).build();
        let args = command_args(&mut cmd);
        assert!(args.contains(&"-hide_banner".to_string()));
        assert!(args.contains(&"-y".to_string()));
    }
}
