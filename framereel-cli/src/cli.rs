// framereel-cli/src/cli.rs
//
// Defines the command-line argument structure using clap. Every flag has a
// default, so running `framereel` inside an export directory just works.

use clap::Parser;
use framereel_core::config::{
    DEFAULT_FFMPEG_BINARY, DEFAULT_FPS, DEFAULT_FRAME_PATTERN, DEFAULT_PRIMARY_OUTPUT, MAX_FPS,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "framereel: compile an exported frame sequence into distribution-ready videos",
    long_about = "Encodes a numbered PNG sequence into a primary H.264 video, derives square, \
                  vertical and widescreen variants from it, and renders a looping GIF preview."
)]
pub struct Cli {
    /// printf-style frame file template
    #[arg(short = 'p', long, value_name = "PATTERN", default_value = DEFAULT_FRAME_PATTERN)]
    pub pattern: String,

    /// Directory containing the exported frames
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub frames_dir: PathBuf,

    /// Primary video file name (relative paths land in --output-dir)
    #[arg(short = 'o', long, value_name = "FILE", default_value = DEFAULT_PRIMARY_OUTPUT)]
    pub output: PathBuf,

    /// Directory receiving the primary, the variants and the preview
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Input frame rate; the primary keeps it
    #[arg(
        short = 'r',
        long,
        value_name = "FPS",
        default_value_t = DEFAULT_FPS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_FPS))
    )]
    pub fps: u32,

    /// ffmpeg executable to use
    #[arg(long, value_name = "PATH", env = "FRAMEREEL_FFMPEG", default_value = DEFAULT_FFMPEG_BINARY)]
    pub ffmpeg: PathBuf,

    /// Derive variants concurrently with each other and with the preview
    #[arg(long)]
    pub parallel: bool,

    /// Skip the GIF preview
    #[arg(long)]
    pub no_preview: bool,

    /// Skip probing finished files for their dimensions
    #[arg(long)]
    pub no_verify: bool,

    /// Emit progress events as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Write the run report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Also write logs to framereel_<timestamp>.log in this directory
    #[arg(short, long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
