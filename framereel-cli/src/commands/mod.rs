//! Command implementations for the CLI.

/// The compile run: frames in, primary + variants + preview out.
pub mod compile;
