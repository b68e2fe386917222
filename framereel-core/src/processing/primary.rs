//! Primary encode: frame sequence in, one high-quality H.264 file out.

use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, run_ffmpeg};
use crate::frames::FrameSequence;
use crate::profiles::{PRIMARY_QUALITY, QualityPreset};
use crate::temp_files::StagedOutput;
use crate::utils::clip_duration_secs;

use ffmpeg_sidecar::command::FfmpegCommand;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::apply_quality;

/// The encoded primary video every other artifact is derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryArtifact {
    pub path: PathBuf,
    /// Output frame rate, equal to the input frame rate.
    pub fps: u32,
    /// Frames actually encoded (the leading contiguous run).
    pub frame_count: usize,
    pub duration_secs: f64,
    pub quality: QualityPreset,
    pub size_bytes: u64,
    /// Filled in by a post-encode probe when one succeeds.
    pub resolution: Option<(u32, u32)>,
}

/// Builds the primary encode on top of `base`, writing to `output`.
pub fn build_primary_command(
    base: FfmpegCommand,
    frames: &FrameSequence,
    fps: u32,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::from_command(base).build();
    cmd.args(["-framerate", &fps.to_string()]);
    if let Some(first) = frames.first_index().filter(|&i| i != 0) {
        cmd.args(["-start_number", &first.to_string()]);
    }
    cmd.input(frames.input_spec());
    apply_quality(&mut cmd, &PRIMARY_QUALITY);
    cmd.output(output);
    cmd
}

/// Encodes `frames` at `fps` into `output_path`.
///
/// The encoder writes into a staged file that replaces `output_path` only on
/// success. `on_progress` receives ffmpeg's frame counter as it advances.
pub fn encode_primary<S, F>(
    spawner: &S,
    frames: &FrameSequence,
    fps: u32,
    output_path: &Path,
    on_progress: F,
) -> CoreResult<PrimaryArtifact>
where
    S: FfmpegSpawner,
    F: FnMut(u32),
{
    if frames.is_empty() {
        return Err(CoreError::FramesMissing {
            pattern: frames.pattern().to_string(),
            dir: frames.dir().to_path_buf(),
        });
    }

    let staged = StagedOutput::new(output_path)?;
    let cmd = build_primary_command(spawner.new_command(), frames, fps, staged.path());
    run_ffmpeg(spawner, cmd, "primary", on_progress)?;
    let size_bytes = staged.commit("primary")?;

    let frame_count = frames.contiguous_len();
    Ok(PrimaryArtifact {
        path: output_path.to_path_buf(),
        fps,
        frame_count,
        duration_secs: clip_duration_secs(frame_count, fps),
        quality: PRIMARY_QUALITY,
        size_bytes,
        resolution: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::command_args;
    use crate::frames::FramePattern;

    fn sequence(indices: Vec<u32>) -> FrameSequence {
        FrameSequence::new(
            PathBuf::from("export"),
            FramePattern::parse("frame_%04d.png").unwrap(),
            indices,
        )
    }

    #[test]
    fn test_primary_arguments() {
        let frames = sequence((0..240).collect());
        let mut cmd = build_primary_command(
            FfmpegCommand::new(),
            &frames,
            60,
            Path::new("out/ad-main.mp4"),
        );
        let args = command_args(&mut cmd).join(" ");

        assert!(args.contains("-y"));
        assert!(args.contains("-framerate 60 -i export/frame_%04d.png"));
        assert!(args.contains("-c:v libx264 -preset slow -crf 18 -pix_fmt yuv420p"));
        assert!(args.contains("-movflags +faststart"));
        assert!(args.ends_with("out/ad-main.mp4"));
        assert!(!args.contains("-start_number"));
    }

    #[test]
    fn test_sequence_not_starting_at_zero() {
        let frames = sequence((1..=10).collect());
        let mut cmd =
            build_primary_command(FfmpegCommand::new(), &frames, 30, Path::new("ad-main.mp4"));
        let args = command_args(&mut cmd).join(" ");
        assert!(args.contains("-framerate 30 -start_number 1 -i"));
    }
}
