//! Encoding profiles.
//!
//! The derived variants come from a fixed, ordered registry. Adding a platform
//! means adding an entry to [`VARIANT_PROFILES`]; the deriver just loops over it.

use serde::Serialize;
use std::fmt;

/// Codec settings for one encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityPreset {
    pub codec: &'static str,
    /// Constant rate factor (lower is better quality).
    pub crf: u8,
    /// x264 speed/effort preset.
    pub preset: &'static str,
    pub pixel_format: &'static str,
}

/// Visually near-lossless, high-effort settings for the primary artifact.
pub const PRIMARY_QUALITY: QualityPreset = QualityPreset {
    codec: "libx264",
    crf: 18,
    preset: "slow",
    pixel_format: "yuv420p",
};

/// Distribution-copy settings for the variants, favouring speed.
pub const VARIANT_QUALITY: QualityPreset = QualityPreset {
    codec: "libx264",
    crf: 23,
    preset: "fast",
    pixel_format: "yuv420p",
};

/// A named target output: exact dimensions, file name and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeProfile {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub filename: &'static str,
    pub quality: QualityPreset,
}

impl EncodeProfile {
    /// `W:H`, the form used by both the scale and pad filters.
    #[must_use]
    pub fn size_arg(&self) -> String {
        format!("{}:{}", self.width, self.height)
    }
}

impl fmt::Display for EncodeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

/// The variant registry, in derivation order.
pub const VARIANT_PROFILES: &[EncodeProfile] = &[
    EncodeProfile {
        name: "square",
        width: 1080,
        height: 1080,
        filename: "ad-square.mp4",
        quality: VARIANT_QUALITY,
    },
    EncodeProfile {
        name: "vertical",
        width: 1080,
        height: 1920,
        filename: "ad-vertical.mp4",
        quality: VARIANT_QUALITY,
    },
    EncodeProfile {
        name: "widescreen",
        width: 1280,
        height: 720,
        filename: "ad-widescreen.mp4",
        quality: VARIANT_QUALITY,
    },
];

/// Looks up a registry profile by name.
#[must_use]
pub fn find_profile(name: &str) -> Option<&'static EncodeProfile> {
    VARIANT_PROFILES.iter().find(|p| p.name == name)
}
