// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! `core` contains the harness engine: input discovery, the three checkers,
//! the per-base lock registry, and report assembly.
//!
//! Boundary: core may depend on `model` and `ports`; direct host effects
//! belong in `adapters` implementations.

use std::path::PathBuf;
use std::time::Duration;

use crate::model::{RunId, RunModes};
use crate::ports::{Fs, FsWrite, Git, ProcessRunner, Walk};

mod checkers;
pub mod discovery;
mod limits;
pub mod locks;
pub mod logging;
mod report;
mod runner;

pub use checkers::{
    plan_manifest_jobs, run_lint_checker, run_manifest_checker, DirectoryRender, ManifestJob,
};
pub use discovery::{discover_inputs, DiscoveredInputs, DiscoveryConfig};
pub use limits::{concurrency_limit, detected_concurrency_limit, MAX_WORKERS, MIN_WORKERS};
pub use locks::{LockError, LockGuard, LockRegistry};
pub use report::{
    exit_code_for_report, render_ci_text, render_json, render_jsonl, render_text,
    render_text_summary,
};
pub use runner::run_harness;

/// External linter invoked once over an entire file set; the discovered file
/// paths are appended to `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintTool {
    pub program: String,
    pub args: Vec<String>,
}

/// Manifest composition tool invoked once per directory; the directory path
/// is appended to `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestBuildTool {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub markdown: LintTool,
    pub shell: LintTool,
    pub manifest: ManifestBuildTool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            markdown: LintTool {
                program: "markdownlint".to_string(),
                args: vec!["--config".to_string(), ".markdownlint.yaml".to_string()],
            },
            shell: LintTool {
                program: "shellcheck".to_string(),
                args: Vec::new(),
            },
            manifest: ManifestBuildTool {
                program: "kustomize".to_string(),
                args: vec!["build".to_string(), "--enable-helm".to_string()],
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessRequest {
    pub repo_root: PathBuf,
    pub run_id: RunId,
    pub modes: RunModes,
    /// Worker override; `None` derives the limit from detected CPU count.
    pub jobs: Option<usize>,
    pub lock_retry: Duration,
    pub lock_timeout: Duration,
    pub tools: ToolConfig,
    pub discovery: DiscoveryConfig,
    pub command: String,
}

impl HarnessRequest {
    pub fn new(repo_root: PathBuf, run_id: RunId) -> Self {
        Self {
            repo_root,
            run_id,
            modes: RunModes::default(),
            jobs: None,
            lock_retry: locks::DEFAULT_RETRY_INTERVAL,
            lock_timeout: locks::DEFAULT_MAX_WAIT,
            tools: ToolConfig::default(),
            discovery: DiscoveryConfig::default(),
            command: "groundwork-verify run".to_string(),
        }
    }
}

/// Borrowed adapter bundle; one `FakeWorld` or `RealWorld` can back every
/// port at once.
pub struct HarnessWorld<'a> {
    pub fs: &'a dyn Fs,
    pub fs_write: &'a dyn FsWrite,
    pub walk: &'a dyn Walk,
    pub git: &'a dyn Git,
    pub process: &'a dyn ProcessRunner,
}
