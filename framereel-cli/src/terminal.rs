//! Terminal UI components and styling for framereel.
//!
//! Status lines go through the `log` macros so they land in the log file too
//! when `--log-dir` is set. The primary encode gets an indicatif progress bar
//! on stderr, drawn only when stderr is a terminal.

use console::{Term, style};
use framereel_core::events::{Event, EventHandler, Stage};
use framereel_core::processing::PipelineState;
use framereel_core::reporting::{ArtifactOutcome, PipelineReport, PreviewOutcome};
use framereel_core::utils::{display_name, format_bytes};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const LABEL_WIDTH: usize = 12;

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::colors_enabled_stderr()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a subsection or processing step
pub fn print_processing(message: &str) {
    if should_use_color() {
        info!("  » {}", style(message).bold());
    } else {
        info!("  » {message}");
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str) {
    let padding = LABEL_WIDTH.saturating_sub(label.width()).max(1);
    info!("    {label}:{} {value}", " ".repeat(padding));
}

pub fn print_success(message: &str) {
    if should_use_color() {
        info!("    ✓ {}", message.green());
    } else {
        info!("    ✓ {message}");
    }
}

pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("    ⚠ {}", message.yellow());
    } else {
        info!("    ⚠ {message}");
    }
}

/// Print a fatal error with an optional suggestion
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }

    info!("");
    info!("  Message:  {message}");

    if let Some(suggestion_text) = suggestion {
        info!("");
        info!("  Suggestion: {suggestion_text}");
    }

    info!("");
}

/// Print the end-of-run listing of every artifact.
pub fn print_report(report: &PipelineReport) {
    print_section("Summary");
    print_status(
        "primary",
        &format!(
            "{} ({})",
            display_name(&report.primary.path),
            format_bytes(report.primary.size_bytes)
        ),
    );

    for variant in &report.variants {
        match &variant.outcome {
            ArtifactOutcome::Succeeded { path, size_bytes } => print_status(
                variant.profile.name,
                &format!("{} ({})", display_name(path), format_bytes(*size_bytes)),
            ),
            ArtifactOutcome::Failed { diagnostic } => {
                print_status(variant.profile.name, &failed_text(diagnostic));
            }
        }
    }

    match &report.preview {
        PreviewOutcome::Succeeded(preview) => print_status(
            "preview",
            &format!(
                "{} ({})",
                display_name(&preview.path),
                format_bytes(preview.size_bytes)
            ),
        ),
        PreviewOutcome::Failed { diagnostic } => print_status("preview", &failed_text(diagnostic)),
        PreviewOutcome::Skipped => print_status("preview", "skipped"),
    }

    info!("");
    let totals = format!(
        "{} written, {} failed in {:.1}s",
        report.success_count(),
        report.failure_count(),
        report.elapsed_secs
    );
    if report.is_complete_success() {
        print_success(&totals);
    } else {
        print_warning(&totals);
    }
}

fn failed_text(diagnostic: &str) -> String {
    let first = diagnostic.lines().next().unwrap_or(diagnostic);
    if should_use_color() {
        format!("{} {first}", "FAILED:".red().bold())
    } else {
        format!("FAILED: {first}")
    }
}

/// Progress bar for the primary encode, sized by frame count.
fn init_progress_bar(total_frames: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_frames);

    let term_width = Term::stderr().size().1 as usize;
    let template = if term_width >= 80 {
        "    ⧖ Encoding: {percent:>3}% [{bar:30}] {pos}/{len} frames ({eta})"
    } else {
        "    ⧖ {percent:>3}% [{bar:15}]"
    };
    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.");
    pb.set_style(style);

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders pipeline events as status lines.
#[derive(Default)]
pub struct TerminalEventHandler {
    progress: Mutex<Option<ProgressBar>>,
}

impl TerminalEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_progress(&self, frame: u32, total_frames: u64) {
        if let Ok(mut progress) = self.progress.lock() {
            let pb = progress.get_or_insert_with(|| init_progress_bar(total_frames));
            pb.set_position(u64::from(frame).min(total_frames));
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut progress) = self.progress.lock() {
            if let Some(pb) = progress.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl EventHandler for TerminalEventHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::StateChanged { to, .. } => match to {
                PipelineState::CheckingPreconditions => print_processing("Checking preconditions"),
                PipelineState::EncodingPrimary => print_processing("Encoding primary video"),
                PipelineState::DerivingVariants => print_processing("Deriving variants"),
                PipelineState::GeneratingPreview => print_processing("Generating preview"),
                _ => {}
            },

            Event::PreconditionsPassed {
                encoder,
                frame_count,
                first_index,
            } => {
                print_status("Encoder", encoder);
                print_status("Frames", &format!("{frame_count} (from #{first_index})"));
            }

            Event::FramesDiscontiguous {
                gaps,
                encoded_frames,
            } => {
                let missing: Vec<String> = gaps
                    .iter()
                    .map(|(start, end)| {
                        if start == end {
                            start.to_string()
                        } else {
                            format!("{start}-{end}")
                        }
                    })
                    .collect();
                print_warning(&format!(
                    "Missing frame(s) {}; encoding the first {encoded_frames}",
                    missing.join(", ")
                ));
            }

            Event::StageStarted { stage, output } => {
                log::debug!("{stage} -> {}", output.display());
            }

            Event::StageProgress {
                stage: Stage::Primary,
                frame,
                total_frames,
            } => self.update_progress(*frame, *total_frames),

            Event::StageProgress { .. } => {}

            Event::StageSucceeded {
                stage,
                output,
                size_bytes,
                elapsed_secs,
            } => {
                if matches!(stage, Stage::Primary) {
                    self.finish_progress();
                }
                print_success(&format!(
                    "{stage}: {} ({}, {elapsed_secs:.1}s)",
                    display_name(output),
                    format_bytes(*size_bytes)
                ));
            }

            Event::StageFailed {
                stage,
                fatal,
                diagnostic,
            } => {
                if matches!(stage, Stage::Primary) {
                    self.finish_progress();
                }
                // Fatal errors are reported once by the command itself
                if !*fatal {
                    let first = diagnostic.lines().next().unwrap_or(diagnostic);
                    print_warning(&format!("{stage} failed: {first}"));
                }
            }

            Event::PipelineFinished { .. } => {}
        }
    }
}
