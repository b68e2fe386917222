//! Variant derivation.
//!
//! Every profile in [`VARIANT_PROFILES`] is derived from the primary
//! independently: the frame is scaled to fit the profile's box and padded
//! with black to its exact size. A failing profile is recorded and the rest
//! still run.

use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher, Stage};
use crate::external::{
    FfmpegCommandBuilder, FfmpegSpawner, FfprobeExecutor, VideoFilterChain, run_ffmpeg,
};
use crate::profiles::{EncodeProfile, VARIANT_PROFILES};
use crate::reporting::{ArtifactOutcome, DerivedArtifact};
use crate::temp_files::StagedOutput;

use ffmpeg_sidecar::command::FfmpegCommand;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

use super::PrimaryArtifact;
use super::{apply_quality, diagnostic_of};

/// Colour of the letterbox/pillarbox bars.
const PAD_COLOR: &str = "black";

/// Builds the encode for one profile, reading `input` and writing `output`.
pub fn build_variant_command(
    base: FfmpegCommand,
    input: &Path,
    profile: &EncodeProfile,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::from_command(base).build();
    cmd.input(input);

    let filters = VideoFilterChain::new()
        .add_fit_within(profile.width, profile.height)
        .add_letterbox(profile.width, profile.height, PAD_COLOR)
        .build();
    if let Some(filters) = filters {
        cmd.args(["-vf", filters.as_str()]);
    }

    apply_quality(&mut cmd, &profile.quality);
    cmd.output(output);
    cmd
}

/// Derives one variant of `primary` into `output_dir`.
///
/// Returns `CoreError::PrimaryMissing` without spawning anything when the
/// primary file is gone.
pub fn derive_variant<S: FfmpegSpawner>(
    spawner: &S,
    primary: &PrimaryArtifact,
    profile: &EncodeProfile,
    output_dir: &Path,
) -> CoreResult<DerivedArtifact> {
    derive_variant_checked(spawner, None, primary, profile, output_dir)
}

/// Like [`derive_variant`], additionally probing the encoded file when a
/// prober is given. A confirmed size mismatch fails the variant; a probe that
/// cannot run is logged and ignored.
pub fn derive_variant_checked<S: FfmpegSpawner>(
    spawner: &S,
    prober: Option<&dyn FfprobeExecutor>,
    primary: &PrimaryArtifact,
    profile: &EncodeProfile,
    output_dir: &Path,
) -> CoreResult<DerivedArtifact> {
    if !primary.path.is_file() {
        return Err(CoreError::PrimaryMissing(primary.path.clone()));
    }

    let target = output_dir.join(profile.filename);
    let staged = StagedOutput::new(&target)?;
    let cmd = build_variant_command(spawner.new_command(), &primary.path, profile, staged.path());
    run_ffmpeg(spawner, cmd, profile.name, |_| {})?;

    if let Some(prober) = prober {
        verify_dimensions(prober, staged.path(), profile)?;
    }

    let size_bytes = staged.commit(profile.name)?;
    Ok(DerivedArtifact {
        profile: *profile,
        outcome: ArtifactOutcome::Succeeded {
            path: target,
            size_bytes,
        },
    })
}

fn verify_dimensions(
    prober: &dyn FfprobeExecutor,
    path: &Path,
    profile: &EncodeProfile,
) -> CoreResult<()> {
    match prober.probe_video(path) {
        Ok(props) if props.width == profile.width && props.height == profile.height => Ok(()),
        Ok(props) => Err(CoreError::OutputVerification(format!(
            "{} variant is {}x{}, expected {}x{}",
            profile.name, props.width, props.height, profile.width, profile.height
        ))),
        Err(e) => {
            log::warn!("Could not verify {} variant: {e}", profile.name);
            Ok(())
        }
    }
}

/// Attempts every registry profile and returns one entry per profile, in
/// registry order. Never aborts the set.
///
/// With `parallel`, profiles are encoded on the rayon pool.
pub fn derive_variants<S: FfmpegSpawner>(
    spawner: &S,
    prober: Option<&dyn FfprobeExecutor>,
    primary: &PrimaryArtifact,
    output_dir: &Path,
    parallel: bool,
    events: &EventDispatcher,
) -> Vec<DerivedArtifact> {
    let run_one = |profile: &EncodeProfile| {
        attempt_variant(spawner, prober, primary, profile, output_dir, events)
    };

    if parallel {
        VARIANT_PROFILES.par_iter().map(run_one).collect()
    } else {
        VARIANT_PROFILES.iter().map(run_one).collect()
    }
}

fn attempt_variant<S: FfmpegSpawner>(
    spawner: &S,
    prober: Option<&dyn FfprobeExecutor>,
    primary: &PrimaryArtifact,
    profile: &EncodeProfile,
    output_dir: &Path,
    events: &EventDispatcher,
) -> DerivedArtifact {
    let stage = Stage::Variant {
        profile: profile.name,
    };
    let target = output_dir.join(profile.filename);
    events.emit(Event::StageStarted {
        stage,
        output: target.clone(),
    });

    let start = Instant::now();
    match derive_variant_checked(spawner, prober, primary, profile, output_dir) {
        Ok(artifact) => {
            if let ArtifactOutcome::Succeeded { path, size_bytes } = &artifact.outcome {
                events.emit(Event::StageSucceeded {
                    stage,
                    output: path.clone(),
                    size_bytes: *size_bytes,
                    elapsed_secs: start.elapsed().as_secs_f64(),
                });
            }
            artifact
        }
        Err(e) => {
            let diagnostic = diagnostic_of(&e);
            events.emit(Event::StageFailed {
                stage,
                fatal: false,
                diagnostic: diagnostic.clone(),
            });
            DerivedArtifact {
                profile: *profile,
                outcome: ArtifactOutcome::Failed { diagnostic },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::command_args;
    use crate::profiles::find_profile;

    #[test]
    fn test_widescreen_arguments() {
        let profile = find_profile("widescreen").unwrap();
        let mut cmd = build_variant_command(
            FfmpegCommand::new(),
            Path::new("out/ad-main.mp4"),
            profile,
            Path::new("out/ad-widescreen.mp4"),
        );
        let args = command_args(&mut cmd);

        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(
            args[vf + 1],
            "scale=1280:720:force_original_aspect_ratio=decrease,pad=1280:720:(ow-iw)/2:(oh-ih)/2:black"
        );
        let joined = args.join(" ");
        assert!(joined.contains("-i out/ad-main.mp4"));
        assert!(joined.contains("-c:v libx264 -preset fast -crf 23 -pix_fmt yuv420p"));
        assert!(joined.ends_with("out/ad-widescreen.mp4"));
    }
}
