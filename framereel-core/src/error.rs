//! Error types for the framereel pipeline.
//!
//! Every variant corresponds to a real external-tool or filesystem failure.
//! Whether an error is fatal depends on the stage it occurs in: the
//! orchestrator aborts on precondition and primary-stage errors, and records
//! variant/preview errors against the affected artifact.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for framereel
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Encoder '{0}' is not available. Install ffmpeg (e.g. `brew install ffmpeg` or `apt install ffmpeg`) or pass --ffmpeg")]
    EncoderMissing(String),

    #[error("No frame files matching '{pattern}' found in {dir}. Export the PNG sequence first")]
    FramesMissing { pattern: String, dir: PathBuf },

    #[error("{stage} encode failed: {diagnostic}")]
    EncodeFailed { stage: String, diagnostic: String },

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid frame pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Primary artifact not found: {}", .0.display())]
    PrimaryMissing(PathBuf),

    #[error("Output verification failed: {0}")]
    OutputVerification(String),

    #[error("ffprobe error: {0}")]
    FfprobeParse(String),
}

/// Result type for framereel operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a process that could not be spawned.
pub fn command_start_error(cmd_name: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd_name.into(), err)
}

/// Builds a `CommandWait` error for a process whose exit could not be collected.
pub fn command_wait_error(cmd_name: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd_name.into(), err)
}

/// Builds an `EncodeFailed` error carrying the tool's diagnostic text verbatim.
pub fn encode_failed_error(stage: impl Into<String>, diagnostic: impl Into<String>) -> CoreError {
    CoreError::EncodeFailed {
        stage: stage.into(),
        diagnostic: diagnostic.into(),
    }
}

impl CoreError {
    /// True for the two precondition failures that stop a run before encoding.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, CoreError::EncoderMissing(_) | CoreError::FramesMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_failed_message_keeps_diagnostic() {
        let err = encode_failed_error("primary", "Unknown encoder 'libx264'");
        assert_eq!(
            err.to_string(),
            "primary encode failed: Unknown encoder 'libx264'"
        );
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_precondition_errors() {
        assert!(CoreError::EncoderMissing("ffmpeg".into()).is_precondition());
        let frames = CoreError::FramesMissing {
            pattern: "frame_%04d.png".into(),
            dir: PathBuf::from("."),
        };
        assert!(frames.is_precondition());
        assert!(frames.to_string().contains("Export the PNG sequence first"));
    }
}
