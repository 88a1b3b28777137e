// SPDX-License-Identifier: Apache-2.0

//! The three checkers. Lint checkers are one buffered tool invocation over a
//! whole file set; the manifest checker is a two-phase bounded worker pool
//! with per-base locking.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use crate::model::{
    schema_version, CheckKind, CheckOutcome, CheckStatus, ManifestDirectory, ManifestFailure,
    ManifestRole,
};
use crate::ports::{Fs, ProcessRunner};

use super::locks::LockRegistry;
use super::{LintTool, ManifestBuildTool};

/// Runs one linter over the whole file set. Empty set reports skipped; a
/// missing or failing tool reports failed with whatever diagnostics were
/// captured.
pub fn run_lint_checker(
    kind: CheckKind,
    tool: &LintTool,
    files: &[PathBuf],
    process: &dyn ProcessRunner,
    repo_root: &Path,
) -> CheckOutcome {
    if files.is_empty() {
        return CheckOutcome::skipped(kind);
    }
    let started = Instant::now();
    let mut args = tool.args.clone();
    args.extend(files.iter().map(|f| f.display().to_string()));

    let (status, output) = match process.run_captured(&tool.program, &args, repo_root) {
        Ok(capture) => {
            let status = if capture.success() {
                CheckStatus::Ok
            } else {
                CheckStatus::Failed
            };
            (status, capture.combined_output())
        }
        Err(err) => (CheckStatus::Failed, format!("{err}\n")),
    };

    CheckOutcome {
        schema_version: schema_version(),
        kind,
        status,
        output,
        failures: Vec::new(),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

/// One unit of manifest work with its precomputed lock key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestJob {
    pub directory: ManifestDirectory,
    pub lock_key: PathBuf,
}

/// Computes lock keys up front, before any worker spawns: the canonical
/// sibling `base` directory when one exists, otherwise the directory's own
/// canonical path.
pub fn plan_manifest_jobs(
    fs: &dyn Fs,
    repo_root: &Path,
    dirs: &[ManifestDirectory],
) -> Vec<ManifestJob> {
    dirs.iter()
        .map(|dir| {
            let sibling_base = dir.path.parent().map(|parent| parent.join("base"));
            let key_path = match sibling_base {
                Some(base) if fs.exists(repo_root, &base) => base,
                _ => dir.path.clone(),
            };
            let lock_key = fs
                .canonicalize(repo_root, &key_path)
                .unwrap_or_else(|_| repo_root.join(&key_path));
            ManifestJob {
                directory: dir.clone(),
                lock_key,
            }
        })
        .collect()
}

/// Per-directory render record, kept alongside the outcome so debug mode can
/// retain rendered manifests and captured stderr as artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRender {
    pub directory: String,
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// Set when the render never ran cleanly: lock timeout or a process
    /// launch error.
    pub detail: Option<String>,
}

impl DirectoryRender {
    pub fn success(&self) -> bool {
        self.exit_status == 0 && self.detail.is_none()
    }

    fn failure_detail(&self) -> String {
        if let Some(detail) = &self.detail {
            return detail.clone();
        }
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit status {}", self.exit_status)
        } else {
            stderr.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManifestCheckerOutput {
    pub outcome: CheckOutcome,
    pub renders: Vec<DirectoryRender>,
}

/// Renders every directory, base phase first, then overlays; a failing
/// directory never halts the others. Worker parallelism is capped at
/// `workers`; renders sharing a lock key are serialized.
pub fn run_manifest_checker(
    jobs: &[ManifestJob],
    tool: &ManifestBuildTool,
    process: &dyn ProcessRunner,
    repo_root: &Path,
    workers: usize,
    locks: &LockRegistry,
) -> ManifestCheckerOutput {
    if jobs.is_empty() {
        return ManifestCheckerOutput {
            outcome: CheckOutcome::skipped(CheckKind::ManifestBuild),
            renders: Vec::new(),
        };
    }
    let started = Instant::now();

    let (bases, overlays): (Vec<_>, Vec<_>) = jobs
        .iter()
        .cloned()
        .partition(|job| job.directory.role == ManifestRole::Base);

    let mut renders = Vec::with_capacity(jobs.len());
    // Bases must all finish (success or failure) before any overlay starts.
    renders.extend(run_phase(bases, tool, process, repo_root, workers, locks));
    renders.extend(run_phase(overlays, tool, process, repo_root, workers, locks));

    let failures: Vec<ManifestFailure> = renders
        .iter()
        .filter(|render| !render.success())
        .map(|render| ManifestFailure {
            schema_version: schema_version(),
            directory: render.directory.clone(),
            detail: render.failure_detail(),
        })
        .collect();

    let status = if failures.is_empty() {
        CheckStatus::Ok
    } else {
        CheckStatus::Failed
    };
    ManifestCheckerOutput {
        outcome: CheckOutcome {
            schema_version: schema_version(),
            kind: CheckKind::ManifestBuild,
            status,
            output: String::new(),
            failures,
            duration_ms: started.elapsed().as_millis() as u64,
        },
        renders,
    }
}

fn run_phase(
    jobs: Vec<ManifestJob>,
    tool: &ManifestBuildTool,
    process: &dyn ProcessRunner,
    repo_root: &Path,
    workers: usize,
    locks: &LockRegistry,
) -> Vec<DirectoryRender> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let worker_count = workers.max(1).min(jobs.len());
    let queue = Mutex::new(VecDeque::from(jobs));
    let renders = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|| loop {
                let job = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some(job) = job else {
                    break;
                };
                let render = render_directory(&job, tool, process, repo_root, locks);
                renders
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(render);
            });
        }
    });

    renders.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn render_directory(
    job: &ManifestJob,
    tool: &ManifestBuildTool,
    process: &dyn ProcessRunner,
    repo_root: &Path,
    locks: &LockRegistry,
) -> DirectoryRender {
    let started = Instant::now();
    let directory = job.directory.path.display().to_string();

    let guard = match locks.acquire(&job.lock_key) {
        Ok(guard) => guard,
        Err(err) => {
            return DirectoryRender {
                directory,
                exit_status: -1,
                stdout: String::new(),
                stderr: String::new(),
                duration_ms: started.elapsed().as_millis() as u64,
                detail: Some(err.to_string()),
            }
        }
    };

    let mut args = tool.args.clone();
    args.push(directory.clone());
    let render = match process.run_captured(&tool.program, &args, repo_root) {
        Ok(capture) => DirectoryRender {
            directory,
            exit_status: capture.status,
            stdout: capture.stdout,
            stderr: capture.stderr,
            duration_ms: started.elapsed().as_millis() as u64,
            detail: None,
        },
        Err(err) => DirectoryRender {
            directory,
            exit_status: -1,
            stdout: String::new(),
            stderr: String::new(),
            duration_ms: started.elapsed().as_millis() as u64,
            detail: Some(err.to_string()),
        },
    };
    drop(guard); // released unconditionally, success or failure
    render
}
