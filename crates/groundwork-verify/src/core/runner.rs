// SPDX-License-Identifier: Apache-2.0

//! Top-level run: discover once, run the three checkers concurrently, join,
//! and assemble the report. Checker output stays buffered until the join;
//! the caller is the only writer to the shared terminal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;

use crate::model::{schema_version, CheckKind, RunReport, RunSummary};
use crate::ports::FsWrite;

use super::checkers::{plan_manifest_jobs, run_lint_checker, run_manifest_checker, DirectoryRender};
use super::discovery::discover_inputs;
use super::limits::detected_concurrency_limit;
use super::locks::LockRegistry;
use super::{HarnessRequest, HarnessWorld};

pub fn run_harness(world: &HarnessWorld<'_>, request: &HarnessRequest) -> Result<RunReport, String> {
    let inputs = discover_inputs(world.git, world.walk, &request.repo_root, &request.discovery);
    let jobs = plan_manifest_jobs(world.fs, &request.repo_root, &inputs.manifest_dirs);
    let workers = request.jobs.unwrap_or_else(detected_concurrency_limit);
    let locks = LockRegistry::new(request.lock_retry, request.lock_timeout);

    let tools = &request.tools;
    let repo_root = request.repo_root.as_path();
    let process = world.process;

    let (markdown, shell, manifest) = thread::scope(|scope| {
        let markdown = scope.spawn(|| {
            run_lint_checker(
                CheckKind::Markdown,
                &tools.markdown,
                &inputs.markdown,
                process,
                repo_root,
            )
        });
        let shell = scope.spawn(|| {
            run_lint_checker(
                CheckKind::Shell,
                &tools.shell,
                &inputs.shell,
                process,
                repo_root,
            )
        });
        let manifest = scope.spawn(|| {
            run_manifest_checker(&jobs, &tools.manifest, process, repo_root, workers, &locks)
        });
        (markdown.join(), shell.join(), manifest.join())
    });

    let markdown = markdown.map_err(|_| "markdown checker panicked".to_string())?;
    let shell = shell.map_err(|_| "shell checker panicked".to_string())?;
    let manifest = manifest.map_err(|_| "manifest checker panicked".to_string())?;

    if request.modes.debug_mode {
        retain_debug_artifacts(
            world.fs_write,
            repo_root,
            request.run_id.as_str(),
            &manifest.renders,
        )?;
    }

    let outcomes = vec![markdown, shell, manifest.outcome];
    let durations_ms: BTreeMap<String, u64> = outcomes
        .iter()
        .map(|outcome| (outcome.kind.key().to_string(), outcome.duration_ms))
        .collect();
    let summary = RunSummary::from_outcomes(&outcomes);

    Ok(RunReport {
        schema_version: schema_version(),
        run_id: request.run_id.clone(),
        repo_root: request.repo_root.display().to_string(),
        command: request.command.clone(),
        modes: request.modes,
        workers: workers as u64,
        outcomes,
        durations_ms,
        summary,
    })
}

/// Debug mode keeps each directory's rendered manifest and captured stderr
/// under `artifacts/verify/<run_id>/manifests/`.
fn retain_debug_artifacts(
    fs_write: &dyn FsWrite,
    repo_root: &Path,
    run_id: &str,
    renders: &[DirectoryRender],
) -> Result<(), String> {
    for render in renders {
        let slug = directory_slug(&render.directory);
        let base = PathBuf::from("artifacts")
            .join("verify")
            .join(run_id)
            .join("manifests");
        if !render.stdout.is_empty() {
            fs_write
                .write_text(
                    repo_root,
                    run_id,
                    &base.join(format!("{slug}.yaml")),
                    &render.stdout,
                )
                .map_err(|err| err.to_string())?;
        }
        if !render.stderr.is_empty() {
            fs_write
                .write_text(
                    repo_root,
                    run_id,
                    &base.join(format!("{slug}.stderr.txt")),
                    &render.stderr,
                )
                .map_err(|err| err.to_string())?;
        }
    }
    Ok(())
}

fn directory_slug(directory: &str) -> String {
    directory
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RealFs;

    #[test]
    fn slug_flattens_path_separators() {
        assert_eq!(directory_slug("deploy/ingress/dev"), "deploy_ingress_dev");
    }

    fn render(directory: &str, stdout: &str, stderr: &str) -> DirectoryRender {
        DirectoryRender {
            directory: directory.to_string(),
            exit_status: i32::from(!stderr.is_empty()),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration_ms: 1,
            detail: None,
        }
    }

    #[test]
    fn debug_artifacts_land_under_the_run_scoped_manifests_dir() {
        let repo = tempfile::tempdir().expect("tempdir");
        let renders = vec![
            render("deploy/ingress/dev", "apiVersion: v1\n", ""),
            render("bootstrap/cni/base", "", "error: accumulating resources\n"),
        ];
        retain_debug_artifacts(&RealFs, repo.path(), "run_one", &renders).expect("retain");

        let base = repo.path().join("artifacts/verify/run_one/manifests");
        assert!(base.join("deploy_ingress_dev.yaml").exists());
        assert!(!base.join("deploy_ingress_dev.stderr.txt").exists());
        assert!(base.join("bootstrap_cni_base.stderr.txt").exists());
        assert!(!base.join("bootstrap_cni_base.yaml").exists());

        let stderr = std::fs::read_to_string(base.join("bootstrap_cni_base.stderr.txt"))
            .expect("stderr artifact");
        assert!(stderr.contains("accumulating resources"));
    }

    #[test]
    fn renders_with_empty_streams_leave_no_artifact_files() {
        let repo = tempfile::tempdir().expect("tempdir");
        let renders = vec![render("x/base", "", "")];
        retain_debug_artifacts(&RealFs, repo.path(), "run_two", &renders).expect("retain");

        let manifests = repo.path().join("artifacts/verify/run_two/manifests");
        assert!(!manifests.join("x_base.yaml").exists());
        assert!(!manifests.join("x_base.stderr.txt").exists());
    }
}
