// ============================================================================
// framereel-cli/src/main.rs
// ============================================================================
//
// FRAMEREEL CLI: Main Entry Point
//
// Parses arguments, initialises logging, runs the pipeline and turns the
// outcome into an exit code:
//
// - 0: the pipeline reached Done, even if some variants or the preview failed
// - 1: argument errors, configuration errors, and aborted runs (missing
//      encoder, missing frames, failed primary)

use clap::Parser;
use framereel_cli::error::{error_title, suggestion};
use framereel_cli::{Cli, logging, run_compile, terminal};
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }

    match run_compile(&cli) {
        Ok(report) => {
            if !report.is_complete_success() {
                log::warn!(
                    "{} artifact(s) failed; see the summary above",
                    report.failure_count()
                );
            }
        }
        Err(e) => {
            terminal::print_error(error_title(&e), &e.to_string(), suggestion(&e));
            process::exit(1);
        }
    }
}
