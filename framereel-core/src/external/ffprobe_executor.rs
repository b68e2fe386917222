//! FFprobe integration for checking finished artifacts.
//!
//! Probing is best-effort: the pipeline uses it to fill in the primary's
//! resolution and to confirm each variant landed on its exact target size.
//! A probe that cannot run never fails a stage on its own.

use crate::error::{CoreError, CoreResult, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Stream properties of an encoded artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub duration_secs: Option<f64>,
    pub frame_rate: Option<f64>,
}

/// Trait for probing encoded artifacts.
pub trait FfprobeExecutor: Send + Sync {
    /// Reads the first video stream's properties.
    fn probe_video(&self, path: &Path) -> CoreResult<VideoProperties>;
}

/// Implementation backed by the `ffprobe` crate (ffprobe on `PATH`).
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe_video(&self, path: &Path) -> CoreResult<VideoProperties> {
        log::debug!("Running ffprobe (via crate) on: {}", path.display());
        let metadata = ffprobe(path).map_err(map_ffprobe_error)?;

        let stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!("No video stream found in {}", path.display()))
            })?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w as u32, h as u32),
            (w, h) => {
                return Err(CoreError::FfprobeParse(format!(
                    "Invalid dimensions in {}: width={w:?}, height={h:?}",
                    path.display()
                )));
            }
        };

        let duration_secs = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok());

        Ok(VideoProperties {
            width,
            height,
            duration_secs,
            frame_rate: parse_frame_rate(&stream.avg_frame_rate)
                .or_else(|| parse_frame_rate(&stream.r_frame_rate)),
        })
    }
}

/// Parses ffprobe's rational frame rates (`60/1`, `30000/1001`).
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((n, d)) => (n.trim().parse::<f64>().ok()?, d.trim().parse::<f64>().ok()?),
        None => (rate.trim().parse::<f64>().ok()?, 1.0),
    };
    (den > 0.0 && num > 0.0).then(|| num / den)
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => CoreError::FfprobeParse(format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error: {err:?}")),
    }
}
