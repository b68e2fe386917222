// ============================================================================
// framereel-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates every interaction with the external encoder. The
// pipeline only ever talks to the traits defined here, so tests can swap in
// fakes that record arguments and simulate success or failure.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: spawn an encode and collect its outcome
// - FfprobeExecutor: read stream properties of a finished artifact
// - Command and filter-chain builders
// - Dependency checking

use crate::error::{CoreError, CoreResult};

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Command and filter-chain builders
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for probing finished artifacts
pub mod ffprobe_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{FfmpegCommandBuilder, VideoFilterChain, command_args, command_line};
pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, VideoProperties};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command can be invoked.
///
/// Runs `<cmd> -version` with output discarded. A missing binary, a
/// permission error, or a non-zero exit all count as unavailable.
///
/// # Returns
///
/// * `Ok(())` - The command ran and exited successfully
/// * `Err(CoreError::EncoderMissing)` - The command was not found
/// * `Err(CoreError::CommandStart)` - The command exists but could not start
/// * `Err(CoreError::EncodeFailed)` - The command ran but reported failure
pub(crate) fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let cmd_name = cmd.display().to_string();

    let result = Command::new(cmd)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(status) if status.success() => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Ok(status) => {
            log::warn!("Dependency '{cmd_name}' exited with {status} for -version");
            Err(crate::error::encode_failed_error(
                "dependency check",
                format!("'{cmd_name} -version' exited with {status}"),
            ))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::EncoderMissing(cmd_name))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name, e))
        }
    }
}
