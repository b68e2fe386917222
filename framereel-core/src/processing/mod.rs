//! The derivation pipeline.
//!
//! Each stage lives in its own submodule and can be called on its own; the
//! [`Pipeline`] orchestrator sequences them, decides which failures are fatal,
//! and assembles the report.

use crate::error::CoreError;
use crate::profiles::QualityPreset;
use ffmpeg_sidecar::command::FfmpegCommand;

/// Encoder and frame checks run before anything is written
pub mod precondition;

/// Frame sequence to primary artifact
pub mod primary;

/// Fixed-size platform variants of the primary
pub mod variants;

/// Looping animated preview
pub mod preview;

/// Orchestration and the pipeline state machine
pub mod pipeline;

pub use pipeline::{AbortReason, Pipeline, PipelineState};
pub use precondition::{check_encoder_available, check_frames_present};
pub use preview::{PreviewArtifact, build_preview_command, generate_preview};
pub use primary::{PrimaryArtifact, build_primary_command, encode_primary};
pub use variants::{build_variant_command, derive_variant, derive_variant_checked, derive_variants};

/// Appends the codec, rate control and container flags of `quality`.
pub(crate) fn apply_quality(cmd: &mut FfmpegCommand, quality: &QualityPreset) {
    cmd.args(["-c:v", quality.codec]);
    cmd.args(["-preset", quality.preset]);
    cmd.args(["-crf", &quality.crf.to_string()]);
    cmd.args(["-pix_fmt", quality.pixel_format]);
    cmd.args(["-movflags", "+faststart"]);
}

/// The encoder's own text for encode failures, the error message otherwise.
pub(crate) fn diagnostic_of(err: &CoreError) -> String {
    match err {
        CoreError::EncodeFailed { diagnostic, .. } => diagnostic.clone(),
        other => other.to_string(),
    }
}
