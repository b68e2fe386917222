// framereel-core/tests/common/mod.rs
//
// Recording fakes for the encoder and prober capabilities, shared by the
// integration tests. Every spawn is recorded; commands succeed by default and
// write dummy bytes to their output path (the last argument).

#![allow(dead_code)]

use framereel_core::config::{PipelineConfig, PipelineConfigBuilder};
use framereel_core::error::{CoreError, CoreResult};
use framereel_core::events::{Event, EventHandler};
use framereel_core::external::{
    FfmpegProcess, FfmpegSpawner, FfprobeExecutor, VideoProperties, command_args,
};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    error_lines: Vec<String>,
    exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        handler(FfmpegEvent::Log(LogLevel::Info, "mock encoder running".to_string()))?;
        for line in &self.error_lines {
            handler(FfmpegEvent::Log(LogLevel::Error, line.clone()))?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// What a matching command should do.
#[derive(Clone)]
enum Outcome {
    Exit { code: i32, error_lines: Vec<String> },
    EmptyOutput,
}

#[derive(Clone)]
struct Rule {
    arg_pattern: String,
    outcome: Outcome,
}

/// Mock implementation of FfmpegSpawner.
#[derive(Clone)]
pub struct MockFfmpegSpawner {
    available: bool,
    rules: Arc<Mutex<Vec<Rule>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Default for MockFfmpegSpawner {
    fn default() -> Self {
        Self {
            available: true,
            rules: Arc::default(),
            received_calls: Arc::default(),
        }
    }
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spawner whose encoder binary cannot be invoked.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Commands with an argument containing `arg_pattern` exit with `code`
    /// after printing `error_line` at error level.
    pub fn fail_when(&self, arg_pattern: &str, code: i32, error_line: &str) {
        self.rules.lock().unwrap().push(Rule {
            arg_pattern: arg_pattern.to_string(),
            outcome: Outcome::Exit {
                code,
                error_lines: vec![error_line.to_string()],
            },
        });
    }

    /// Commands matching `arg_pattern` exit cleanly without writing output.
    pub fn empty_output_when(&self, arg_pattern: &str) {
        self.rules.lock().unwrap().push(Rule {
            arg_pattern: arg_pattern.to_string(),
            outcome: Outcome::EmptyOutput,
        });
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }

    /// Number of recorded calls with an argument containing `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.get_received_calls()
            .iter()
            .filter(|args| args.iter().any(|a| a.contains(pattern)))
            .count()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args = command_args(&mut cmd);
        self.received_calls.lock().unwrap().push(args.clone());

        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| args.iter().any(|a| a.contains(&r.arg_pattern)))
            .cloned();

        let output = args.last().map(PathBuf::from);
        match rule.map(|r| r.outcome) {
            Some(Outcome::Exit { code, error_lines }) => Ok(MockFfmpegProcess {
                error_lines,
                exit_status: ExitStatus::from_raw(code << 8),
            }),
            Some(Outcome::EmptyOutput) => Ok(success()),
            None => {
                if let Some(output) = output {
                    std::fs::write(&output, b"mock encoded data")?;
                }
                Ok(success())
            }
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

fn success() -> MockFfmpegProcess {
    MockFfmpegProcess {
        error_lines: Vec::new(),
        exit_status: ExitStatus::from_raw(0),
    }
}

/// Mock implementation of FfprobeExecutor. Paths are matched by substring;
/// unmatched paths fail to probe.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    dimensions: Arc<Mutex<Vec<(String, u32, u32)>>>,
    probed: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_dimensions(&self, path_pattern: &str, width: u32, height: u32) {
        self.dimensions
            .lock()
            .unwrap()
            .push((path_pattern.to_string(), width, height));
    }

    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe_video(&self, path: &Path) -> CoreResult<VideoProperties> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        let name = path.to_string_lossy();
        self.dimensions
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _, _)| name.contains(pattern.as_str()))
            .map(|(_, width, height)| VideoProperties {
                width: *width,
                height: *height,
                ..Default::default()
            })
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!("no mock dimensions for {}", path.display()))
            })
    }
}

/// Collects every emitted event.
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventHandler for RecordingHandler {
    fn handle(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Writes `frame_%04d.png` placeholders for every index in `indices`.
pub fn write_frames(dir: &Path, indices: impl IntoIterator<Item = u32>) {
    for i in indices {
        std::fs::write(dir.join(format!("frame_{i:04}.png")), b"png").unwrap();
    }
}

/// Config reading frames from `frames_dir` and writing into `output_dir`.
pub fn test_config(frames_dir: &Path, output_dir: &Path) -> PipelineConfig {
    PipelineConfigBuilder::new()
        .frames_dir(frames_dir.to_path_buf())
        .output_dir(output_dir.to_path_buf())
        .ffmpeg_path(PathBuf::from("mock-ffmpeg"))
        .build()
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
