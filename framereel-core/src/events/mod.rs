//! Pipeline events.
//!
//! The orchestrator reports what it is doing through [`Event`]s sent to an
//! [`EventDispatcher`]. The CLI turns them into status lines or a JSON stream;
//! tests can collect them directly.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::processing::PipelineState;

pub mod json_handler;

/// The encode a stage event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    Primary,
    Variant { profile: &'static str },
    Preview,
}

impl Stage {
    /// Short label used in error messages and logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Primary => "primary",
            Stage::Variant { profile } => profile,
            Stage::Preview => "preview",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Primary => f.write_str("primary video"),
            Stage::Variant { profile } => write!(f, "{profile} variant"),
            Stage::Preview => f.write_str("preview"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },

    PreconditionsPassed {
        encoder: String,
        frame_count: usize,
        first_index: u32,
    },

    /// Frames are missing inside the sequence; only the leading run is encoded.
    FramesDiscontiguous {
        gaps: Vec<(u32, u32)>,
        encoded_frames: usize,
    },

    StageStarted {
        stage: Stage,
        output: PathBuf,
    },

    StageProgress {
        stage: Stage,
        frame: u32,
        total_frames: u64,
    },

    StageSucceeded {
        stage: Stage,
        output: PathBuf,
        size_bytes: u64,
        elapsed_secs: f64,
    },

    StageFailed {
        stage: Stage,
        fatal: bool,
        diagnostic: String,
    },

    PipelineFinished {
        succeeded: usize,
        failed: usize,
        elapsed_secs: f64,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

#[derive(Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler that writes every event to the `log` facade at debug level.
#[derive(Debug, Default)]
pub struct LogEventHandler;

impl EventHandler for LogEventHandler {
    fn handle(&self, event: &Event) {
        log::debug!("event: {event:?}");
    }
}
