// ============================================================================
// framereel-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This is the narrow capability the pipeline depends on: "run the encoder
// with these arguments, report progress, capture exit status and diagnostic
// text". Production code uses ffmpeg-sidecar; tests substitute a spawner that
// records arguments and scripts the outcome.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - run_ffmpeg: spawn, drain events, wait, and map failure to EncodeFailed

use crate::error::{
    CoreResult, command_start_error, command_wait_error, encode_failed_error,
};
use crate::external::ffmpeg_builder::command_line;
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Number of trailing log lines kept when ffmpeg prints no error-level line.
const DIAGNOSTIC_TAIL_LINES: usize = 10;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
///
/// Implementations must be shareable across threads so variants can be
/// derived concurrently.
pub trait FfmpegSpawner: Send + Sync {
    type Process: FfmpegProcess;

    /// Returns a fresh command pointing at this spawner's encoder binary.
    fn new_command(&self) -> FfmpegCommand {
        FfmpegCommand::new()
    }

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;

    /// True iff the encoder binary can be invoked. Never errors.
    fn is_available(&self) -> bool;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            encode_failed_error("ffmpeg", format!("could not read encoder output: {e}"))
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone)]
pub struct SidecarSpawner {
    ffmpeg_path: PathBuf,
}

impl SidecarSpawner {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }
}

impl Default for SidecarSpawner {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FFMPEG_BINARY)
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn new_command(&self) -> FfmpegCommand {
        FfmpegCommand::new_with_path(&self.ffmpeg_path)
    }

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error(self.ffmpeg_path.display().to_string(), e))
    }

    fn is_available(&self) -> bool {
        super::check_dependency(&self.ffmpeg_path).is_ok()
    }
}

// --- Running a command to completion ---

/// Collects the diagnostic text of a run.
#[derive(Default)]
struct Diagnostics {
    errors: Vec<String>,
    tail: VecDeque<String>,
}

impl Diagnostics {
    fn record_log(&mut self, level: LogLevel, line: String) {
        match level {
            LogLevel::Error | LogLevel::Fatal => self.errors.push(line),
            _ => {
                if self.tail.len() == DIAGNOSTIC_TAIL_LINES {
                    self.tail.pop_front();
                }
                self.tail.push_back(line);
            }
        }
    }

    fn render(self, status: ExitStatus) -> String {
        if !self.errors.is_empty() {
            self.errors.join("\n")
        } else if !self.tail.is_empty() {
            self.tail.into_iter().collect::<Vec<_>>().join("\n")
        } else {
            format!("ffmpeg exited with {status}")
        }
    }
}

/// Spawns `cmd`, drains its events, and waits for it to exit.
///
/// `on_progress` receives ffmpeg's running frame counter. A non-zero exit
/// becomes `CoreError::EncodeFailed` for `stage`, carrying ffmpeg's error
/// lines verbatim (or the tail of its log if it printed none).
pub fn run_ffmpeg<S, P>(
    spawner: &S,
    mut cmd: FfmpegCommand,
    stage: &str,
    mut on_progress: P,
) -> CoreResult<()>
where
    S: FfmpegSpawner,
    P: FnMut(u32),
{
    log::debug!("Running {stage} command: {}", command_line(&mut cmd));

    let mut process = spawner.spawn(cmd)?;
    let mut diagnostics = Diagnostics::default();

    process.handle_events(|event| {
        match event {
            FfmpegEvent::Progress(progress) => on_progress(progress.frame),
            FfmpegEvent::Log(level, line) => diagnostics.record_log(level, line),
            FfmpegEvent::Error(line) => diagnostics.errors.push(line),
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if status.success() {
        log::debug!("{stage} command finished successfully");
        Ok(())
    } else {
        let diagnostic = diagnostics.render(status);
        log::error!("{stage} command failed ({status}): {diagnostic}");
        Err(encode_failed_error(stage, diagnostic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn failed_status() -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(1 << 8)
    }

    #[cfg(unix)]
    #[test]
    fn test_diagnostics_prefer_error_lines() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_log(LogLevel::Info, "Input #0, image2".into());
        diagnostics.record_log(LogLevel::Error, "Unknown encoder 'libx264'".into());
        assert_eq!(diagnostics.render(failed_status()), "Unknown encoder 'libx264'");
    }

    #[cfg(unix)]
    #[test]
    fn test_diagnostics_fall_back_to_tail() {
        let mut diagnostics = Diagnostics::default();
        for i in 0..15 {
            diagnostics.record_log(LogLevel::Unknown, format!("line {i}"));
        }
        let rendered = diagnostics.render(failed_status());
        assert!(rendered.starts_with("line 5"));
        assert!(rendered.ends_with("line 14"));
    }

    #[cfg(unix)]
    #[test]
    fn test_diagnostics_empty_output() {
        let rendered = Diagnostics::default().render(failed_status());
        assert!(rendered.starts_with("ffmpeg exited with"));
    }

    #[test]
    fn test_sidecar_spawner_uses_configured_binary() {
        let spawner = SidecarSpawner::new("/opt/ffmpeg/bin/ffmpeg");
        let mut cmd = spawner.new_command();
        assert_eq!(
            cmd.as_inner().get_program(),
            std::ffi::OsStr::new("/opt/ffmpeg/bin/ffmpeg")
        );
        assert!(!SidecarSpawner::new("/definitely/not/here/ffmpeg").is_available());
    }
}
