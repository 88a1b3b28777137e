// SPDX-License-Identifier: Apache-2.0

use crate::adapters::normalize_line_endings;
use crate::ports::{AdapterError, CommandCapture, ProcessRunner};
use std::path::Path;
use std::process::Command;

/// External collaborators the harness is allowed to execute. Anything else
/// is an effect violation, not a lint failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessPolicy {
    allowed_programs: std::collections::BTreeSet<String>,
}

impl SubprocessPolicy {
    pub fn strict_default() -> Self {
        Self {
            allowed_programs: ["git", "markdownlint", "shellcheck", "kustomize"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn allows(&self, program: &str) -> bool {
        self.allowed_programs.contains(program)
    }
}

#[derive(Debug, Default)]
pub struct RealProcessRunner;

impl ProcessRunner for RealProcessRunner {
    fn run_captured(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandCapture, AdapterError> {
        run_subprocess_captured(program, args, cwd, &SubprocessPolicy::strict_default())
    }
}

pub fn run_subprocess_captured(
    program: &str,
    args: &[String],
    cwd: &Path,
    policy: &SubprocessPolicy,
) -> Result<CommandCapture, AdapterError> {
    if !policy.allows(program) {
        return Err(AdapterError::EffectDenied {
            effect: "subprocess",
            detail: format!("program `{program}` is not in subprocess allowlist"),
        });
    }
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|err| AdapterError::Process {
            program: program.to_string(),
            detail: err.to_string(),
        })?;
    Ok(CommandCapture {
        program: program.to_string(),
        args: args.to_vec(),
        status: output.status.code().unwrap_or(1),
        stdout: normalize_line_endings(&String::from_utf8_lossy(&output.stdout)),
        stderr: normalize_line_endings(&String::from_utf8_lossy(&output.stderr)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subprocess_policy_blocks_non_allowlisted_programs() {
        let policy = SubprocessPolicy::strict_default();
        let err = run_subprocess_captured("python3", &[], Path::new("."), &policy)
            .expect_err("deny");
        assert!(matches!(
            err,
            AdapterError::EffectDenied {
                effect: "subprocess",
                ..
            }
        ));
    }

    #[test]
    fn policy_allows_harness_collaborators() {
        let policy = SubprocessPolicy::strict_default();
        for program in ["git", "markdownlint", "shellcheck", "kustomize"] {
            assert!(policy.allows(program), "{program} must be allowed");
        }
    }
}
