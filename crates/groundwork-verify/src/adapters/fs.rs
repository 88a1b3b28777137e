// SPDX-License-Identifier: Apache-2.0

use crate::ports::{AdapterError, Fs, FsWrite, Walk};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn canonicalize_from_repo_root(repo_root: &Path, path: &Path) -> Result<PathBuf, AdapterError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    };
    joined.canonicalize().map_err(|err| AdapterError::Io {
        op: "canonicalize",
        path: joined,
        detail: err.to_string(),
    })
}

/// Debug-mode artifacts are the only writes this tool performs; confine them
/// to `artifacts/verify/<run_id>/` so a verification run can never touch the
/// working tree it is checking.
pub fn ensure_write_path_under_artifacts(
    repo_root: &Path,
    run_id: &str,
    target: &Path,
) -> Result<PathBuf, AdapterError> {
    let write_root = repo_root.join("artifacts").join("verify").join(run_id);
    fs::create_dir_all(&write_root).map_err(|err| AdapterError::Io {
        op: "create_dir_all",
        path: write_root.clone(),
        detail: err.to_string(),
    })?;

    let absolute_target = if target.is_absolute() {
        target.to_path_buf()
    } else {
        repo_root.join(target)
    };

    let normalized_root = normalize_path(&write_root);
    let normalized_target = normalize_path(&absolute_target);

    if !normalized_target.starts_with(&normalized_root) {
        return Err(AdapterError::PathViolation {
            path: absolute_target,
            detail: format!("writes allowed only under {}", normalized_root.display()),
        });
    }

    if let Some(parent) = absolute_target.parent() {
        fs::create_dir_all(parent).map_err(|err| AdapterError::Io {
            op: "create_dir_all",
            path: parent.to_path_buf(),
            detail: err.to_string(),
        })?;
    }
    Ok(absolute_target)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[derive(Debug, Default)]
pub struct RealFs;

impl Fs for RealFs {
    fn exists(&self, repo_root: &Path, path: &Path) -> bool {
        let target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            repo_root.join(path)
        };
        target.exists()
    }

    fn canonicalize(&self, repo_root: &Path, path: &Path) -> Result<PathBuf, AdapterError> {
        canonicalize_from_repo_root(repo_root, path)
    }
}

impl FsWrite for RealFs {
    fn write_text(
        &self,
        repo_root: &Path,
        run_id: &str,
        path: &Path,
        content: &str,
    ) -> Result<PathBuf, AdapterError> {
        let target = ensure_write_path_under_artifacts(repo_root, run_id, path)?;
        let normalized = normalize_line_endings(content);
        fs::write(&target, normalized).map_err(|err| AdapterError::Io {
            op: "write",
            path: target.clone(),
            detail: err.to_string(),
        })?;
        Ok(target)
    }
}

impl Walk for RealFs {
    fn walk_files(&self, repo_root: &Path, root: &Path) -> Result<Vec<PathBuf>, AdapterError> {
        fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AdapterError> {
            let entries = fs::read_dir(dir).map_err(|err| AdapterError::Io {
                op: "read_dir",
                path: dir.to_path_buf(),
                detail: err.to_string(),
            })?;
            for entry in entries {
                let entry = entry.map_err(|err| AdapterError::Io {
                    op: "read_dir_entry",
                    path: dir.to_path_buf(),
                    detail: err.to_string(),
                })?;
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out)?;
                } else {
                    out.push(path);
                }
            }
            Ok(())
        }

        let target = if root.is_absolute() {
            root.to_path_buf()
        } else {
            repo_root.join(root)
        };
        let mut out = Vec::new();
        if target.exists() {
            walk(&target, &mut out)?;
            out.sort();
        }
        Ok(out)
    }
}
