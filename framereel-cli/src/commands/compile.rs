//! Implementation of the compile run.
//!
//! Maps the parsed arguments onto a `PipelineConfig`, wires the event
//! handlers for the requested output mode, runs the pipeline and writes the
//! optional JSON report.

use crate::cli::Cli;
use crate::error::CliResult;
use crate::terminal::{self, TerminalEventHandler};

use framereel_core::config::{PipelineConfig, PipelineConfigBuilder};
use framereel_core::events::json_handler::JsonEventHandler;
use framereel_core::events::{EventDispatcher, LogEventHandler};
use framereel_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use framereel_core::file_logging::FileLoggingHandler;
use framereel_core::processing::Pipeline;
use framereel_core::reporting::PipelineReport;

use log::info;
use std::sync::Arc;

/// Builds the pipeline configuration from command-line arguments.
pub fn build_config(args: &Cli) -> PipelineConfig {
    PipelineConfigBuilder::new()
        .frames_dir(args.frames_dir.clone())
        .frame_pattern(args.pattern.clone())
        .output_dir(args.output_dir.clone())
        .primary_output(args.output.clone())
        .fps(args.fps)
        .ffmpeg_path(args.ffmpeg.clone())
        .parallel(args.parallel)
        .generate_preview(!args.no_preview)
        .verify_outputs(!args.no_verify)
        .build()
}

/// Event handlers for the requested output mode.
pub fn build_dispatcher(json: bool) -> EventDispatcher {
    let mut events = EventDispatcher::new();
    if json {
        events.add_handler(Arc::new(JsonEventHandler::new()));
        events.add_handler(Arc::new(FileLoggingHandler::new()));
    } else {
        events.add_handler(Arc::new(TerminalEventHandler::new()));
    }
    events.add_handler(Arc::new(LogEventHandler));
    events
}

/// Runs the full pipeline. Returns the report on `Done`, including runs
/// with failed variants; precondition and primary failures are errors.
pub fn run_compile(args: &Cli) -> CliResult<PipelineReport> {
    let config = build_config(args);

    if !args.json {
        terminal::print_section("framereel");
        terminal::print_status(
            "Frames",
            &config.frames_dir.join(&config.frame_pattern).display().to_string(),
        );
        terminal::print_status("Output", &config.output_dir.display().to_string());
        terminal::print_status("Frame rate", &format!("{} fps", config.fps));
        if config.parallel {
            terminal::print_status("Mode", "parallel");
        }
        info!("");
    }

    let spawner = SidecarSpawner::new(config.ffmpeg_path.clone());
    let prober = CrateFfprobeExecutor::new();
    let report = Pipeline::new(config, &spawner, &prober)
        .with_events(build_dispatcher(args.json))
        .run()?;

    // The artifacts are already written; a lost report is not an abort
    if let Some(path) = &args.report {
        match report.write_json(path) {
            Ok(()) => log::debug!("Report written to {}", path.display()),
            Err(e) => log::warn!("Could not write report to {}: {e}", path.display()),
        }
    }

    if args.json {
        // stdout carries only events in this mode
        for line in report.summary_lines() {
            info!("{line}");
        }
    } else {
        terminal::print_report(&report);
    }
    Ok(report)
}
