//! Run reporting.
//!
//! A [`PipelineReport`] is what a completed run hands back: the primary, one
//! entry per registry profile, the preview outcome and the states walked.
//! It renders to summary lines for the terminal and serializes to JSON for
//! `--report`.

use crate::error::CoreResult;
use crate::processing::{PipelineState, PreviewArtifact, PrimaryArtifact};
use crate::profiles::EncodeProfile;
use crate::utils::{display_name, format_bytes, format_duration};

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of one derived artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    Succeeded { path: PathBuf, size_bytes: u64 },
    Failed { diagnostic: String },
}

/// A variant attempt for one registry profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedArtifact {
    pub profile: EncodeProfile,
    pub outcome: ArtifactOutcome,
}

impl DerivedArtifact {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ArtifactOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PreviewOutcome {
    Succeeded(PreviewArtifact),
    Failed { diagnostic: String },
    /// Disabled by configuration.
    Skipped,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Local>,
    pub elapsed_secs: f64,
    pub primary: PrimaryArtifact,
    /// One entry per registry profile, in registry order.
    pub variants: Vec<DerivedArtifact>,
    pub preview: PreviewOutcome,
    pub transitions: Vec<PipelineState>,
}

impl PipelineReport {
    /// Artifacts written, the primary included.
    #[must_use]
    pub fn success_count(&self) -> usize {
        let variants = self.variants.iter().filter(|v| v.is_success()).count();
        let preview = usize::from(matches!(self.preview, PreviewOutcome::Succeeded(_)));
        1 + variants + preview
    }

    /// Variant and preview failures. A report only exists once the primary
    /// succeeded, so it never counts here.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        let variants = self.variants.iter().filter(|v| !v.is_success()).count();
        let preview = usize::from(matches!(self.preview, PreviewOutcome::Failed { .. }));
        variants + preview
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Human-readable lines listing every artifact with its size or diagnostic.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.variants.len() + 3);

        let resolution = self
            .primary
            .resolution
            .map(|(w, h)| format!(", {w}x{h}"))
            .unwrap_or_default();
        lines.push(format!(
            "primary     {} ({}, {} frames @ {} fps, {}{resolution})",
            display_name(&self.primary.path),
            format_bytes(self.primary.size_bytes),
            self.primary.frame_count,
            self.primary.fps,
            format_duration(self.primary.duration_secs),
        ));

        for variant in &self.variants {
            let line = match &variant.outcome {
                ArtifactOutcome::Succeeded { path, size_bytes } => format!(
                    "{:<11} {} ({})",
                    variant.profile.name,
                    display_name(path),
                    format_bytes(*size_bytes)
                ),
                ArtifactOutcome::Failed { diagnostic } => {
                    format!("{:<11} FAILED: {}", variant.profile.name, first_line(diagnostic))
                }
            };
            lines.push(line);
        }

        lines.push(match &self.preview {
            PreviewOutcome::Succeeded(preview) => format!(
                "preview     {} ({})",
                display_name(&preview.path),
                format_bytes(preview.size_bytes)
            ),
            PreviewOutcome::Failed { diagnostic } => {
                format!("preview     FAILED: {}", first_line(diagnostic))
            }
            PreviewOutcome::Skipped => "preview     skipped".to_string(),
        });

        lines.push(format!(
            "{} written, {} failed in {:.1}s",
            self.success_count(),
            self.failure_count(),
            self.elapsed_secs
        ));
        lines
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(io::Error::from)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
