// ============================================================================
// framereel-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE: Orchestration of a full derivation run
//
// The orchestrator walks a small state machine:
//
//   Idle -> CheckingPreconditions -> EncodingPrimary -> DerivingVariants
//        -> GeneratingPreview -> Done
//
// with Aborted reachable only from the precondition and primary stages.
// Variant and preview failures are recorded in the report and never abort.
// Every transition is recorded and emitted as an event.

use crate::config::PipelineConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher, Stage};
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::frames::{FrameSequence, discover_frames};
use crate::reporting::{DerivedArtifact, PipelineReport, PreviewOutcome};

use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

use super::diagnostic_of;
use super::precondition::{check_encoder_available, check_frames_present};
use super::preview::generate_preview;
use super::primary::{PrimaryArtifact, encode_primary};
use super::variants::derive_variants;

/// Why a run stopped before producing a primary artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    EncoderMissing,
    FramesMissing,
    EncodeFailed,
    /// The primary could not be written or committed.
    IoError,
}

impl AbortReason {
    fn from_error(err: &CoreError) -> Self {
        match err {
            CoreError::EncoderMissing(_) => AbortReason::EncoderMissing,
            CoreError::FramesMissing { .. } => AbortReason::FramesMissing,
            CoreError::Io(_) => AbortReason::IoError,
            _ => AbortReason::EncodeFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    CheckingPreconditions,
    EncodingPrimary,
    DerivingVariants,
    GeneratingPreview,
    Done,
    Aborted(AbortReason),
}

impl PipelineState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Aborted(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::CheckingPreconditions => f.write_str("checking preconditions"),
            PipelineState::EncodingPrimary => f.write_str("encoding primary"),
            PipelineState::DerivingVariants => f.write_str("deriving variants"),
            PipelineState::GeneratingPreview => f.write_str("generating preview"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Aborted(reason) => write!(f, "aborted ({reason:?})"),
        }
    }
}

/// One derivation run over a frame sequence.
///
/// The spawner and prober are borrowed so callers keep access to them after
/// the run.
pub struct Pipeline<'a, S, P> {
    config: PipelineConfig,
    spawner: &'a S,
    prober: &'a P,
    events: EventDispatcher,
    state: PipelineState,
    transitions: Vec<PipelineState>,
}

impl<'a, S, P> Pipeline<'a, S, P>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
{
    pub fn new(config: PipelineConfig, spawner: &'a S, prober: &'a P) -> Self {
        Self {
            config,
            spawner,
            prober,
            events: EventDispatcher::new(),
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// States walked so far, starting with `Idle`.
    #[must_use]
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    /// Runs the pipeline to completion.
    ///
    /// Returns the report once `Done` is reached, which includes runs where
    /// some variants or the preview failed. Precondition failures and primary
    /// failures abort the run and are returned as the error.
    pub fn run(&mut self) -> CoreResult<PipelineReport> {
        if self.state != PipelineState::Idle {
            return Err(CoreError::Config(format!(
                "pipeline already ran (state: {})",
                self.state
            )));
        }
        self.config.validate()?;

        let started_at = Local::now();
        let start = Instant::now();

        self.transition(PipelineState::CheckingPreconditions);
        let frames = match self.check_preconditions() {
            Ok(frames) => frames,
            Err(e) => return Err(self.abort(e)),
        };

        self.transition(PipelineState::EncodingPrimary);
        let primary = match self.primary_stage(&frames) {
            Ok(primary) => primary,
            Err(e) => {
                self.events.emit(Event::StageFailed {
                    stage: Stage::Primary,
                    fatal: true,
                    diagnostic: diagnostic_of(&e),
                });
                return Err(self.abort(e));
            }
        };

        self.transition(PipelineState::DerivingVariants);
        let (variants, preview) = if self.config.parallel {
            self.transition(PipelineState::GeneratingPreview);
            let this = &*self;
            rayon::join(
                || this.variant_stage(&primary),
                || this.preview_stage(&primary),
            )
        } else {
            let variants = self.variant_stage(&primary);
            self.transition(PipelineState::GeneratingPreview);
            (variants, self.preview_stage(&primary))
        };

        self.transition(PipelineState::Done);

        let report = PipelineReport {
            started_at,
            elapsed_secs: start.elapsed().as_secs_f64(),
            primary,
            variants,
            preview,
            transitions: self.transitions.clone(),
        };
        self.events.emit(Event::PipelineFinished {
            succeeded: report.success_count(),
            failed: report.failure_count(),
            elapsed_secs: report.elapsed_secs,
        });
        Ok(report)
    }

    fn transition(&mut self, to: PipelineState) {
        let from = self.state;
        log::debug!("Pipeline state: {from} -> {to}");
        self.state = to;
        self.transitions.push(to);
        self.events.emit(Event::StateChanged { from, to });
    }

    fn abort(&mut self, err: CoreError) -> CoreError {
        self.transition(PipelineState::Aborted(AbortReason::from_error(&err)));
        err
    }

    fn check_preconditions(&self) -> CoreResult<FrameSequence> {
        let config = &self.config;

        if !check_encoder_available(self.spawner) {
            return Err(CoreError::EncoderMissing(
                config.ffmpeg_path.display().to_string(),
            ));
        }

        let frames_missing = || CoreError::FramesMissing {
            pattern: config.frame_pattern.clone(),
            dir: config.frames_dir.clone(),
        };
        if !check_frames_present(&config.frames_dir, &config.frame_pattern) {
            return Err(frames_missing());
        }
        let frames = discover_frames(&config.frames_dir, &config.frame_pattern)?;
        if frames.is_empty() {
            return Err(frames_missing());
        }

        if !frames.is_contiguous() {
            let gaps = frames.gaps();
            log::warn!(
                "Frame sequence has {} gap(s); encoding the first {} of {} frames",
                gaps.len(),
                frames.contiguous_len(),
                frames.len()
            );
            self.events.emit(Event::FramesDiscontiguous {
                gaps,
                encoded_frames: frames.contiguous_len(),
            });
        }

        self.events.emit(Event::PreconditionsPassed {
            encoder: config.ffmpeg_path.display().to_string(),
            frame_count: frames.len(),
            first_index: frames.first_index().unwrap_or(0),
        });
        Ok(frames)
    }

    fn primary_stage(&self, frames: &FrameSequence) -> CoreResult<PrimaryArtifact> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let output = self.config.primary_path();
        self.events.emit(Event::StageStarted {
            stage: Stage::Primary,
            output: output.clone(),
        });

        let total_frames = frames.contiguous_len() as u64;
        let start = Instant::now();
        let mut primary = encode_primary(self.spawner, frames, self.config.fps, &output, |frame| {
            self.events.emit(Event::StageProgress {
                stage: Stage::Primary,
                frame,
                total_frames,
            });
        })?;

        if self.config.verify_outputs {
            match self.prober.probe_video(&primary.path) {
                Ok(props) => primary.resolution = Some((props.width, props.height)),
                Err(e) => log::warn!("Could not probe primary artifact: {e}"),
            }
        }

        self.events.emit(Event::StageSucceeded {
            stage: Stage::Primary,
            output: primary.path.clone(),
            size_bytes: primary.size_bytes,
            elapsed_secs: start.elapsed().as_secs_f64(),
        });
        Ok(primary)
    }

    fn variant_stage(&self, primary: &PrimaryArtifact) -> Vec<DerivedArtifact> {
        let prober: Option<&dyn FfprobeExecutor> = if self.config.verify_outputs {
            Some(self.prober)
        } else {
            None
        };
        derive_variants(
            self.spawner,
            prober,
            primary,
            &self.config.output_dir,
            self.config.parallel,
            &self.events,
        )
    }

    fn preview_stage(&self, primary: &PrimaryArtifact) -> PreviewOutcome {
        if !self.config.generate_preview {
            log::debug!("Preview disabled; skipping");
            return PreviewOutcome::Skipped;
        }

        let output = self.config.preview_path();
        self.events.emit(Event::StageStarted {
            stage: Stage::Preview,
            output: output.clone(),
        });

        let start = Instant::now();
        match generate_preview(self.spawner, primary, &output) {
            Ok(preview) => {
                self.events.emit(Event::StageSucceeded {
                    stage: Stage::Preview,
                    output: preview.path.clone(),
                    size_bytes: preview.size_bytes,
                    elapsed_secs: start.elapsed().as_secs_f64(),
                });
                PreviewOutcome::Succeeded(preview)
            }
            Err(e) => {
                let diagnostic = diagnostic_of(&e);
                self.events.emit(Event::StageFailed {
                    stage: Stage::Preview,
                    fatal: false,
                    diagnostic: diagnostic.clone(),
                });
                PreviewOutcome::Failed { diagnostic }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display_and_terminality() {
        assert_eq!(PipelineState::DerivingVariants.to_string(), "deriving variants");
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Aborted(AbortReason::FramesMissing).is_terminal());
        assert!(!PipelineState::GeneratingPreview.is_terminal());
    }

    #[test]
    fn test_abort_reason_mapping() {
        assert_eq!(
            AbortReason::from_error(&CoreError::EncoderMissing("ffmpeg".into())),
            AbortReason::EncoderMissing
        );
        assert_eq!(
            AbortReason::from_error(&crate::error::encode_failed_error("primary", "boom")),
            AbortReason::EncodeFailed
        );
        let io = CoreError::Io(std::io::Error::other("disk full"));
        assert_eq!(AbortReason::from_error(&io), AbortReason::IoError);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineState::Aborted(AbortReason::EncodeFailed)).unwrap();
        assert_eq!(json, r#"{"aborted":"encode_failed"}"#);
    }
}
