pub mod setup;

pub use setup::setup_file_logging;

use crate::events::{Event, EventHandler, Stage};
use crate::utils::format_bytes;
use log::{debug, info, warn, error};
use std::sync::Mutex;

/// Frames between two progress lines in the log file.
const PROGRESS_LOG_INTERVAL: u32 = 60;

/// Writes pipeline events to the log as plain lines, for the `--log-dir` file.
pub struct FileLoggingHandler {
    last_logged_frame: Mutex<Option<u32>>,
}

impl Default for FileLoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLoggingHandler {
    pub fn new() -> Self {
        Self {
            last_logged_frame: Mutex::new(None),
        }
    }

    fn should_log_progress(&self, frame: u32, total_frames: u64) -> bool {
        let Ok(mut last) = self.last_logged_frame.lock() else {
            return false;
        };
        let due = match *last {
            None => true,
            Some(prev) => {
                frame >= prev.saturating_add(PROGRESS_LOG_INTERVAL)
                    || u64::from(frame) >= total_frames
            }
        };
        if due {
            *last = Some(frame);
        }
        due
    }
}

impl EventHandler for FileLoggingHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::StateChanged { from, to } => {
                debug!("Pipeline state: {from} -> {to}");
            }

            Event::PreconditionsPassed {
                encoder,
                frame_count,
                first_index,
            } => {
                info!("Encoder: {encoder}");
                info!("Frames: {frame_count} (first index {first_index})");
            }

            Event::FramesDiscontiguous {
                gaps,
                encoded_frames,
            } => {
                for (start, end) in gaps {
                    warn!("Missing frames {start}..={end}");
                }
                warn!("Only the first {encoded_frames} contiguous frames will be encoded");
            }

            Event::StageStarted { stage, output } => {
                if matches!(stage, Stage::Primary) {
                    if let Ok(mut last) = self.last_logged_frame.lock() {
                        *last = None;
                    }
                }
                info!("Starting {stage} -> {}", output.display());
            }

            Event::StageProgress {
                stage,
                frame,
                total_frames,
            } => {
                if self.should_log_progress(*frame, *total_frames) {
                    info!("{stage} progress: frame {frame}/{total_frames}");
                }
            }

            Event::StageSucceeded {
                stage,
                output,
                size_bytes,
                elapsed_secs,
            } => {
                info!(
                    "{stage} written: {} ({}, {elapsed_secs:.1}s)",
                    output.display(),
                    format_bytes(*size_bytes)
                );
            }

            Event::StageFailed {
                stage,
                fatal,
                diagnostic,
            } => {
                if *fatal {
                    error!("{stage} failed: {diagnostic}");
                } else {
                    warn!("{stage} failed: {diagnostic}");
                }
            }

            Event::PipelineFinished {
                succeeded,
                failed,
                elapsed_secs,
            } => {
                info!(
                    "Pipeline finished: {succeeded} artifact(s) written, {failed} failed, {elapsed_secs:.1}s"
                );
            }
        }
    }
}
