//! Core library for compiling an exported frame sequence into a set of
//! distribution-ready videos using ffmpeg.
//!
//! A run encodes a primary H.264 video from the numbered frames, derives one
//! fixed-size variant per registry profile, and renders a looping GIF
//! preview. Variant and preview failures are isolated; a missing encoder, a
//! missing frame sequence or a failed primary stops the run.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use framereel_core::config::PipelineConfigBuilder;
//! use framereel_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use framereel_core::processing::Pipeline;
//! use std::path::PathBuf;
//!
//! let config = PipelineConfigBuilder::new()
//!     .frames_dir(PathBuf::from("export"))
//!     .output_dir(PathBuf::from("dist"))
//!     .fps(60)
//!     .build();
//!
//! let spawner = SidecarSpawner::new(config.ffmpeg_path.clone());
//! let prober = CrateFfprobeExecutor::new();
//! let report = Pipeline::new(config, &spawner, &prober).run().unwrap();
//!
//! for line in report.summary_lines() {
//!     println!("{line}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod file_logging;
pub mod frames;
pub mod processing;
pub mod profiles;
pub mod reporting;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventDispatcher, EventHandler, Stage};
pub use frames::{FramePattern, FrameSequence, discover_frames};
pub use processing::{
    AbortReason, Pipeline, PipelineState, PreviewArtifact, PrimaryArtifact,
    check_encoder_available, check_frames_present, derive_variant, derive_variants,
    encode_primary, generate_preview,
};
pub use profiles::{EncodeProfile, QualityPreset, VARIANT_PROFILES};
pub use reporting::{ArtifactOutcome, DerivedArtifact, PipelineReport, PreviewOutcome};
pub use utils::{format_bytes, format_duration};
