// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! `ports` defines IO boundaries consumed by `core`.
//!
//! Boundary: `core` depends on `ports`; `adapters` implement these interfaces.

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    EffectDenied {
        effect: &'static str,
        detail: String,
    },
    PathViolation {
        path: PathBuf,
        detail: String,
    },
    Io {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },
    Process {
        program: String,
        detail: String,
    },
    Git {
        detail: String,
    },
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EffectDenied { effect, detail } => {
                write!(f, "effect denied: {effect} ({detail})")
            }
            Self::PathViolation { path, detail } => {
                write!(f, "path violation: {} ({detail})", path.display())
            }
            Self::Io { op, path, detail } => {
                write!(f, "io error: {op} {} ({detail})", path.display())
            }
            Self::Process { program, detail } => write!(f, "process error: {program} ({detail})"),
            Self::Git { detail } => write!(f, "git error: {detail}"),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Buffered result of one external tool invocation. Stdout and stderr are
/// captured whole so checker output never interleaves on the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCapture {
    pub program: String,
    pub args: Vec<String>,
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandCapture {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Combined diagnostics in arrival order: stdout first, stderr after.
    pub fn combined_output(&self) -> String {
        let mut out = String::new();
        if !self.stdout.trim().is_empty() {
            out.push_str(self.stdout.trim_end_matches('\n'));
            out.push('\n');
        }
        if !self.stderr.trim().is_empty() {
            out.push_str(self.stderr.trim_end_matches('\n'));
            out.push('\n');
        }
        out
    }
}

pub trait Fs {
    fn exists(&self, repo_root: &Path, path: &Path) -> bool;
    fn canonicalize(&self, repo_root: &Path, path: &Path) -> Result<PathBuf, AdapterError>;
}

pub trait FsWrite {
    fn write_text(
        &self,
        repo_root: &Path,
        run_id: &str,
        path: &Path,
        content: &str,
    ) -> Result<PathBuf, AdapterError>;
}

pub trait Walk {
    fn walk_files(&self, repo_root: &Path, root: &Path) -> Result<Vec<PathBuf>, AdapterError>;
}

pub trait Git {
    fn tracked_files(&self, repo_root: &Path) -> Result<Vec<String>, AdapterError>;
}

/// `Sync` because one runner is shared by the checker threads and the
/// manifest worker pool.
pub trait ProcessRunner: Sync {
    fn run_captured(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandCapture, AdapterError>;
}
