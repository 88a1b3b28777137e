// SPDX-License-Identifier: Apache-2.0

use crate::ports::{AdapterError, Git};
use std::path::Path;

#[derive(Debug, Default)]
pub struct RealGit;

impl Git for RealGit {
    fn tracked_files(&self, repo_root: &Path) -> Result<Vec<String>, AdapterError> {
        let output = std::process::Command::new("git")
            .args(["ls-files"])
            .current_dir(repo_root)
            .output()
            .map_err(|err| AdapterError::Git {
                detail: err.to_string(),
            })?;
        if !output.status.success() {
            return Err(AdapterError::Git {
                detail: format!("git ls-files exited with {}", output.status),
            });
        }
        let text = String::from_utf8(output.stdout).map_err(|err| AdapterError::Git {
            detail: err.to_string(),
        })?;
        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
            .collect())
    }
}
