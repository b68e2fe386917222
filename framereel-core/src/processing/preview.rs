//! Looping GIF preview of the primary.

use crate::config::{PREVIEW_FPS, PREVIEW_WIDTH};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, VideoFilterChain, run_ffmpeg};
use crate::temp_files::StagedOutput;

use ffmpeg_sidecar::command::FfmpegCommand;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::PrimaryArtifact;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewArtifact {
    pub path: PathBuf,
    pub fps: u32,
    pub width: u32,
    pub size_bytes: u64,
}

pub fn build_preview_command(base: FfmpegCommand, input: &Path, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::from_command(base).build();
    cmd.input(input);

    let filters = VideoFilterChain::new()
        .add_fps(PREVIEW_FPS)
        .add_scale_width(PREVIEW_WIDTH, "lanczos")
        .build();
    if let Some(filters) = filters {
        cmd.args(["-vf", filters.as_str()]);
    }

    // Infinite loop
    cmd.args(["-loop", "0"]);
    cmd.output(output);
    cmd
}

/// Renders the preview of `primary` into `output_path`.
///
/// Fails with `CoreError::PrimaryMissing`, without spawning the encoder,
/// when the primary file does not exist.
pub fn generate_preview<S: FfmpegSpawner>(
    spawner: &S,
    primary: &PrimaryArtifact,
    output_path: &Path,
) -> CoreResult<PreviewArtifact> {
    if !primary.path.is_file() {
        return Err(CoreError::PrimaryMissing(primary.path.clone()));
    }

    let staged = StagedOutput::new(output_path)?;
    let cmd = build_preview_command(spawner.new_command(), &primary.path, staged.path());
    run_ffmpeg(spawner, cmd, "preview", |_| {})?;
    let size_bytes = staged.commit("preview")?;

    Ok(PreviewArtifact {
        path: output_path.to_path_buf(),
        fps: PREVIEW_FPS,
        width: PREVIEW_WIDTH,
        size_bytes,
    })
}
