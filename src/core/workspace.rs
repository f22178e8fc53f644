//! # Workspace
//!
//! The project a prompt is assembled from: where to scan for files and
//! where to run substitution commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::expand::{self, CommandPolicy, CommandRunner, SystemRunner};
use crate::core::tree::{DEFAULT_MAX_DEPTH, FileTree};

#[derive(Clone)]
pub struct Workspace {
    root: PathBuf,
    max_depth: usize,
    runner: Arc<dyn CommandRunner>,
    policy: CommandPolicy,
}

impl Workspace {
    /// A workspace rooted at `root` that runs commands as real subprocesses.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let runner = Arc::new(SystemRunner::new(root.clone()));
        Self::with_runner(root, runner)
    }

    pub fn with_runner(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            runner,
            policy: CommandPolicy::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> FileTree {
        FileTree::scan(&self.root, self.max_depth)
    }

    /// Expand `$(git ...)` substitutions in `text`.
    pub fn expand_commands(&self, text: &str) -> String {
        expand::expand_commands(text, self.runner.as_ref(), &self.policy)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
