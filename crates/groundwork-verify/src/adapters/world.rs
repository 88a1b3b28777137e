// SPDX-License-Identifier: Apache-2.0

use crate::ports::{
    AdapterError, CommandCapture, Fs, FsWrite, Git, ProcessRunner, Walk,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{RealFs, RealGit, RealProcessRunner};

/// Bundle of live adapters handed to the CLI entry point.
#[derive(Debug, Default)]
pub struct RealWorld {
    pub fs: RealFs,
    pub process: RealProcessRunner,
    pub git: RealGit,
}

impl RealWorld {
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory world for engine tests: stubbed tracked files, a stubbed file
/// tree, and scripted command captures keyed by `(program, args)`.
#[derive(Debug, Default)]
pub struct FakeWorld {
    files: BTreeMap<PathBuf, String>,
    tracked: Option<Vec<String>>,
    captures: BTreeMap<(String, Vec<String>), CommandCapture>,
}

impl FakeWorld {
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.insert(path.into(), text.into());
        self
    }

    pub fn with_tracked_files(mut self, files: &[&str]) -> Self {
        self.tracked = Some(files.iter().map(|f| (*f).to_string()).collect());
        self
    }

    pub fn with_capture(
        mut self,
        program: &str,
        args: &[&str],
        status: i32,
        stdout: &str,
        stderr: &str,
    ) -> Self {
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        self.captures.insert(
            (program.to_string(), args.clone()),
            CommandCapture {
                program: program.to_string(),
                args,
                status,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    fn resolve(&self, repo_root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            repo_root.join(path)
        }
    }
}

impl Fs for FakeWorld {
    fn exists(&self, repo_root: &Path, path: &Path) -> bool {
        let target = self.resolve(repo_root, path);
        // A directory "exists" when any stubbed file lives under it.
        self.files.contains_key(&target)
            || self.files.keys().any(|key| key.starts_with(&target))
    }

    fn canonicalize(&self, repo_root: &Path, path: &Path) -> Result<PathBuf, AdapterError> {
        Ok(self.resolve(repo_root, path))
    }
}

impl FsWrite for FakeWorld {
    fn write_text(
        &self,
        _repo_root: &Path,
        _run_id: &str,
        _path: &Path,
        _content: &str,
    ) -> Result<PathBuf, AdapterError> {
        Err(AdapterError::EffectDenied {
            effect: "fs_write",
            detail: "FakeWorld does not persist artifacts".to_string(),
        })
    }
}

impl Walk for FakeWorld {
    fn walk_files(&self, repo_root: &Path, root: &Path) -> Result<Vec<PathBuf>, AdapterError> {
        let target = self.resolve(repo_root, root);
        Ok(self
            .files
            .keys()
            .filter(|key| key.starts_with(&target))
            .cloned()
            .collect())
    }
}

impl Git for FakeWorld {
    fn tracked_files(&self, _repo_root: &Path) -> Result<Vec<String>, AdapterError> {
        self.tracked.clone().ok_or(AdapterError::Git {
            detail: "tracked files not stubbed in FakeWorld".to_string(),
        })
    }
}

impl ProcessRunner for FakeWorld {
    fn run_captured(
        &self,
        program: &str,
        args: &[String],
        _cwd: &Path,
    ) -> Result<CommandCapture, AdapterError> {
        self.captures
            .get(&(program.to_string(), args.to_vec()))
            .cloned()
            .ok_or(AdapterError::Process {
                program: program.to_string(),
                detail: "command not stubbed in FakeWorld".to_string(),
            })
    }
}
