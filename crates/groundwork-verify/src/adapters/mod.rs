// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! `adapters` implement the `ports` interfaces against the real host.

mod fs;
mod git;
mod process;
mod world;

pub use crate::ports::{AdapterError, CommandCapture, Fs, FsWrite, Git, ProcessRunner, Walk};
pub use fs::{
    canonicalize_from_repo_root, ensure_write_path_under_artifacts, normalize_line_endings,
    RealFs,
};
pub use git::RealGit;
pub use process::{run_subprocess_captured, RealProcessRunner, SubprocessPolicy};
pub use world::{FakeWorld, RealWorld};
