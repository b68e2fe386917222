//! Frame sequence discovery.
//!
//! Frames are exported by an external renderer using a printf-style template
//! such as `frame_%04d.png`. This module parses that template, enumerates the
//! matching files in a directory, and reports the ordered sequence the
//! primary encoder will read.

use crate::error::{CoreError, CoreResult};

use std::fmt;
use std::path::{Path, PathBuf};

/// A parsed printf-style frame template with a single integer conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePattern {
    template: String,
    prefix: String,
    suffix: String,
    /// Zero-padded width for `%0Nd`; `None` for a plain `%d`.
    width: Option<usize>,
}

impl FramePattern {
    /// Parses a file-name template. `%%` is a literal percent sign; exactly
    /// one `%d` or `%0Nd` conversion is required.
    pub fn parse(template: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidPattern(format!("'{template}': {reason}"));

        if Path::new(template)
            .parent()
            .is_some_and(|p| p.to_string_lossy().contains('%'))
        {
            return Err(invalid("the index conversion must be in the file name"));
        }
        let file_template = Path::new(template)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| invalid("no file name"))?;

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut width = None;
        let mut seen_conversion = false;

        let mut chars = file_template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                if seen_conversion {
                    suffix.push(c);
                } else {
                    prefix.push(c);
                }
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                if seen_conversion {
                    suffix.push('%');
                } else {
                    prefix.push('%');
                }
                continue;
            }

            if seen_conversion {
                return Err(invalid("more than one index conversion"));
            }

            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            match chars.next() {
                Some('d') => {}
                _ => return Err(invalid("only %d and %0Nd conversions are supported")),
            }

            width = match digits.as_str() {
                "" => None,
                d if d.starts_with('0') && d.len() > 1 => {
                    let w = d[1..]
                        .parse::<usize>()
                        .map_err(|_| invalid("bad field width"))?;
                    if w == 0 { None } else { Some(w) }
                }
                _ => return Err(invalid("field width must be zero-padded (e.g. %04d)")),
            };
            seen_conversion = true;
        }

        if !seen_conversion {
            return Err(invalid("missing %d index conversion"));
        }

        Ok(Self {
            template: file_template,
            prefix,
            suffix,
            width,
        })
    }

    /// The file-name template as given, suitable for ffmpeg's image2 demuxer.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Renders the file name for a frame index.
    #[must_use]
    pub fn file_name(&self, index: u32) -> String {
        match self.width {
            Some(w) => format!("{}{index:0w$}{}", self.prefix, self.suffix),
            None => format!("{}{index}{}", self.prefix, self.suffix),
        }
    }

    /// Returns the frame index a file name encodes, if it matches the template.
    #[must_use]
    pub fn match_file_name(&self, name: &str) -> Option<u32> {
        let digits = name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = digits.parse::<u32>().ok()?;
        // Only the canonical rendering matches, the same way ffmpeg's sprintf does.
        (self.file_name(index) == name).then_some(index)
    }
}

impl fmt::Display for FramePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Splits a template that may carry a directory component into the directory
/// to scan and the file-name pattern.
pub fn resolve_pattern(frames_dir: &Path, template: &str) -> CoreResult<(PathBuf, FramePattern)> {
    let pattern = FramePattern::parse(template)?;
    let dir = match Path::new(template).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => frames_dir.join(parent),
        _ => frames_dir.to_path_buf(),
    };
    Ok((dir, pattern))
}

/// An ordered collection of exported frames.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    dir: PathBuf,
    pattern: FramePattern,
    indices: Vec<u32>,
}

impl FrameSequence {
    /// Builds a sequence from already-known indices. Indices are sorted and
    /// deduplicated.
    #[must_use]
    pub fn new(dir: PathBuf, pattern: FramePattern, mut indices: Vec<u32>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self {
            dir,
            pattern,
            indices,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn pattern(&self) -> &FramePattern {
        &self.pattern
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Lowest index present.
    #[must_use]
    pub fn first_index(&self) -> Option<u32> {
        self.indices.first().copied()
    }

    /// Number of frames in the run starting at the first index. The image2
    /// demuxer stops at the first missing index, so this is what gets encoded.
    #[must_use]
    pub fn contiguous_len(&self) -> usize {
        let Some(first) = self.first_index() else {
            return 0;
        };
        self.indices
            .iter()
            .enumerate()
            .take_while(|(i, idx)| u64::from(**idx) == u64::from(first) + *i as u64)
            .count()
    }

    /// True when there are no missing indices between the first and last frame.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous_len() == self.len()
    }

    /// Missing index ranges as inclusive `(start, end)` pairs.
    #[must_use]
    pub fn gaps(&self) -> Vec<(u32, u32)> {
        self.indices
            .windows(2)
            .filter(|w| w[1] > w[0] + 1)
            .map(|w| (w[0] + 1, w[1] - 1))
            .collect()
    }

    /// Path handed to ffmpeg's `-i`, with the template left unexpanded.
    #[must_use]
    pub fn input_spec(&self) -> PathBuf {
        self.dir.join(self.pattern.template())
    }
}

/// Enumerates the frames in `frames_dir` that match `template`.
///
/// Returns an empty sequence when nothing matches; the caller decides whether
/// that is fatal. Subdirectories are not searched.
pub fn discover_frames(frames_dir: &Path, template: &str) -> CoreResult<FrameSequence> {
    let (dir, pattern) = resolve_pattern(frames_dir, template)?;

    let indices: Vec<u32> = std::fs::read_dir(&dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            if !entry.file_type().ok()?.is_file() {
                return None;
            }
            let name = entry.file_name();
            pattern.match_file_name(name.to_str()?)
        })
        .collect();

    let sequence = FrameSequence::new(dir, pattern, indices);
    log::debug!(
        "Discovered {} frame(s) matching '{}' in {}",
        sequence.len(),
        sequence.pattern(),
        sequence.dir().display()
    );
    Ok(sequence)
}
