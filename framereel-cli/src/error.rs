// ============================================================================
// framereel-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type; this module adds the user-facing
// pieces: a short title and an optional suggestion for each failure.

use framereel_core::{CoreError, CoreResult};

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Short heading shown above a fatal error.
#[must_use]
pub fn error_title(err: &CoreError) -> &'static str {
    match err {
        CoreError::EncoderMissing(_) => "Encoder not available",
        CoreError::FramesMissing { .. } => "No frames found",
        CoreError::EncodeFailed { .. } => "Primary encode failed",
        CoreError::InvalidPattern(_) | CoreError::Config(_) => "Invalid configuration",
        _ => "Run failed",
    }
}

/// What the user can do about a fatal error, when there is something.
#[must_use]
pub fn suggestion(err: &CoreError) -> Option<&'static str> {
    match err {
        CoreError::EncoderMissing(_) => {
            Some("Install ffmpeg and make sure it is on PATH, or point --ffmpeg / FRAMEREEL_FFMPEG at it")
        }
        CoreError::FramesMissing { .. } => {
            Some("Export the PNG frame sequence first, or pass --frames-dir / --pattern")
        }
        CoreError::InvalidPattern(_) => Some("Use a template with one %d or %0Nd, e.g. frame_%04d.png"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_precondition_errors_have_guidance() {
        let missing = CoreError::EncoderMissing("ffmpeg".into());
        assert_eq!(error_title(&missing), "Encoder not available");
        assert!(suggestion(&missing).unwrap().contains("Install ffmpeg"));

        let frames = CoreError::FramesMissing {
            pattern: "frame_%04d.png".into(),
            dir: PathBuf::from("."),
        };
        assert!(suggestion(&frames).unwrap().contains("Export the PNG frame sequence"));
        assert!(suggestion(&CoreError::Config("x".into())).is_none());
    }
}
