//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::core::clipboard::{ClipboardError, ClipboardWriter};
use crate::core::expand::{CommandError, CommandRunner};
use crate::core::relay::ConsumerCount;
use crate::core::workspace::Workspace;
use crate::tui::component::{StepComponent, StepContext};

/// Create a temporary directory holding `files`.
///
/// Parent directories are created as needed. Each file's content is its own
/// relative path, which makes expansion output easy to assert on.
pub fn temp_tree(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        let path = dir.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, file).unwrap();
    }
    dir
}

/// An 80x24 step context over a workspace rooted at `root`.
pub fn test_ctx(root: &Path) -> StepContext {
    StepContext::new(Arc::new(Workspace::new(root)), 80, 24)
}

/// Render a component into a `width` x `height` test terminal and return the
/// screen as text, one line per row.
pub fn render_to_string(component: &impl StepComponent, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| component.render(frame, frame.area()))
        .unwrap();

    let buffer = terminal.backend().buffer();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A command runner that answers from a fixed script and records every call.
///
/// Unscripted commands fail like a non-zero exit.
#[derive(Default)]
pub struct ScriptedRunner {
    script: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &str, result: Result<&str, &str>) -> Self {
        self.script.insert(
            command.to_string(),
            result.map(str::to_string).map_err(str::to_string),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let mut command = vec![program.to_string()];
        command.extend(args.iter().cloned());
        let command = command.join(" ");
        self.calls.lock().unwrap().push(command.clone());

        match self.script.get(&command) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(status)) => Err(CommandError::Failed {
                program: program.to_string(),
                status: status.clone(),
            }),
            None => Err(CommandError::Failed {
                program: program.to_string(),
                status: "exit status: 128".to_string(),
            }),
        }
    }
}

/// Keeps everything written to it.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn last(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }
}

impl ClipboardWriter for RecordingClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Always refuses, like a machine without a display server.
pub struct FailingClipboard;

impl ClipboardWriter for FailingClipboard {
    fn write(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Poisoned)
    }
}

/// A consumer count that can be changed from the test.
#[derive(Default)]
pub struct FixedCount {
    count: Mutex<usize>,
}

impl FixedCount {
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
        }
    }

    pub fn set(&self, count: usize) {
        *self.count.lock().unwrap() = count;
    }
}

impl ConsumerCount for FixedCount {
    fn connected(&self) -> usize {
        *self.count.lock().unwrap()
    }
}
