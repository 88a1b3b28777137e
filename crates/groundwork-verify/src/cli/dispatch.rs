// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::adapters::RealWorld;
use crate::core::logging::{render_log, LogLevel, LogRecord};
use crate::core::{
    discover_inputs, exit_code_for_report, render_ci_text, render_json, render_jsonl, render_text,
    run_harness, DiscoveryConfig, HarnessRequest, HarnessWorld,
};
use crate::model::{schema_version, CheckStatus, RunId, RunModes};
use crate::ports::ProcessRunner;

use super::{Cli, Command, FormatArg, RunArgs};

const EXIT_USAGE: i32 = 2;
const EXIT_INTERNAL: i32 = 3;

pub(super) fn run_cli(cli: Cli) -> i32 {
    let repo_root = match resolve_repo_root(cli.repo_root.as_deref()) {
        Ok(root) => root,
        Err(message) => {
            eprintln!("groundwork-verify: {message}");
            return EXIT_USAGE;
        }
    };

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run_command(&repo_root, cli.quiet, args),
        Command::List { format, out } => list_command(&repo_root, cli.quiet, format, out),
        Command::Doctor { format, out } => doctor_command(&repo_root, cli.quiet, format, out),
    }
}

fn resolve_repo_root(flag: Option<&Path>) -> Result<PathBuf, String> {
    match flag {
        Some(root) => Ok(root.to_path_buf()),
        None => std::env::current_dir().map_err(|err| format!("cannot resolve cwd: {err}")),
    }
}

fn run_command(repo_root: &Path, quiet: bool, args: RunArgs) -> i32 {
    let run_id = match args.run_id.as_deref() {
        Some(raw) => match RunId::parse(raw) {
            Ok(id) => id,
            Err(message) => {
                eprintln!("groundwork-verify: {message}");
                return EXIT_USAGE;
            }
        },
        None => RunId::generate(now_unix_secs()),
    };

    let mut request = HarnessRequest::new(repo_root.to_path_buf(), run_id);
    request.modes = RunModes {
        ci_mode: args.ci,
        debug_mode: args.debug,
    };
    request.jobs = args.jobs;
    if let Some(ms) = args.lock_timeout_ms {
        request.lock_timeout = Duration::from_millis(ms);
    }

    let world = RealWorld::new();
    let harness_world = HarnessWorld {
        fs: &world.fs,
        fs_write: &world.fs,
        walk: &world.fs,
        git: &world.git,
        process: &world.process,
    };

    if request.modes.debug_mode {
        log_event(
            quiet,
            LogRecord::new(
                LogLevel::Debug,
                "RUN_START",
                &request.run_id,
                "verification run starting",
            ),
        );
    }

    let report = match run_harness(&harness_world, &request) {
        Ok(report) => report,
        Err(message) => {
            eprintln!("groundwork-verify: run failed: {message}");
            return EXIT_INTERNAL;
        }
    };

    let rendered = match args.format {
        FormatArg::Text if request.modes.ci_mode => Ok(render_ci_text(&report)),
        FormatArg::Text => Ok(render_text(&report)),
        FormatArg::Json => render_json(&report),
        FormatArg::Jsonl => render_jsonl(&report),
    };
    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(message) => {
            eprintln!("groundwork-verify: cannot render report: {message}");
            return EXIT_INTERNAL;
        }
    };

    let code = exit_code_for_report(&report);
    for outcome in &report.outcomes {
        if outcome.status == CheckStatus::Failed {
            log_event(
                quiet,
                LogRecord::new(
                    LogLevel::Warn,
                    "CHECK_FAILED",
                    &request.run_id,
                    format!("{} check failed", outcome.kind.title()),
                ),
            );
        }
    }
    if request.modes.debug_mode {
        log_event(
            quiet,
            LogRecord::new(
                LogLevel::Debug,
                "RUN_DONE",
                &request.run_id,
                format!(
                    "verification run finished: ok={} failed={} skipped={}",
                    report.summary.ok, report.summary.failed, report.summary.skipped
                ),
            ),
        );
    }

    match emit(quiet, &rendered, args.out.as_deref()) {
        Ok(_) => code,
        Err(exit) => exit,
    }
}

fn list_command(repo_root: &Path, quiet: bool, format: FormatArg, out: Option<PathBuf>) -> i32 {
    let world = RealWorld::new();
    let inputs = discover_inputs(&world.git, &world.fs, repo_root, &DiscoveryConfig::default());

    let rendered = match format {
        FormatArg::Text => {
            let mut lines = Vec::new();
            lines.push(format!("markdown files: {}", inputs.markdown.len()));
            for path in &inputs.markdown {
                lines.push(format!("  {}", path.display()));
            }
            lines.push(format!("shell files: {}", inputs.shell.len()));
            for path in &inputs.shell {
                lines.push(format!("  {}", path.display()));
            }
            lines.push(format!("manifest directories: {}", inputs.manifest_dirs.len()));
            for dir in &inputs.manifest_dirs {
                lines.push(format!("  {}", dir.path.display()));
            }
            Ok(lines.join("\n"))
        }
        FormatArg::Json => serde_json::to_string_pretty(&json!({
            "schema_version": schema_version(),
            "markdown": inputs.markdown,
            "shell": inputs.shell,
            "manifest_dirs": inputs.manifest_dirs,
        }))
        .map_err(|err| err.to_string()),
        FormatArg::Jsonl => {
            let mut lines = Vec::new();
            for path in &inputs.markdown {
                lines.push(json!({"set": "markdown", "path": path}).to_string());
            }
            for path in &inputs.shell {
                lines.push(json!({"set": "shell", "path": path}).to_string());
            }
            for dir in &inputs.manifest_dirs {
                lines.push(json!({"set": "manifest", "path": dir.path, "role": dir.role}).to_string());
            }
            Ok(lines.join("\n"))
        }
    };

    match rendered {
        Ok(rendered) => emit(quiet, &rendered, out.as_deref()).map_or_else(|exit| exit, |_| 0),
        Err(message) => {
            eprintln!("groundwork-verify: cannot render listing: {message}");
            EXIT_INTERNAL
        }
    }
}

fn doctor_command(repo_root: &Path, quiet: bool, format: FormatArg, out: Option<PathBuf>) -> i32 {
    let world = RealWorld::new();
    let git_ok = tool_available(&world.process, repo_root, "git", &["--version"]);
    let markdownlint_ok =
        tool_available(&world.process, repo_root, "markdownlint", &["--version"]);
    let shellcheck_ok = tool_available(&world.process, repo_root, "shellcheck", &["--version"]);
    let kustomize_ok = tool_available(&world.process, repo_root, "kustomize", &["version"]);

    // Missing lint or build tools surface as check failures at run time; only
    // a missing git blocks discovery entirely.
    let status = if git_ok { "ok" } else { "degraded" };

    let rendered = match format {
        FormatArg::Text => Ok([
            format!("repo root: {}", repo_root.display()),
            format!("git: {}", present(git_ok)),
            format!("markdownlint: {}", present(markdownlint_ok)),
            format!("shellcheck: {}", present(shellcheck_ok)),
            format!("kustomize: {}", present(kustomize_ok)),
            format!("status: {status}"),
        ]
        .join("\n")),
        FormatArg::Json | FormatArg::Jsonl => {
            let payload = json!({
                "schema_version": schema_version(),
                "repo_root": repo_root.display().to_string(),
                "status": status,
                "tools": {
                    "git": git_ok,
                    "markdownlint": markdownlint_ok,
                    "shellcheck": shellcheck_ok,
                    "kustomize": kustomize_ok,
                },
            });
            if format == FormatArg::Json {
                serde_json::to_string_pretty(&payload).map_err(|err| err.to_string())
            } else {
                Ok(payload.to_string())
            }
        }
    };

    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(message) => {
            eprintln!("groundwork-verify: cannot render doctor report: {message}");
            return EXIT_INTERNAL;
        }
    };
    let code = i32::from(!git_ok);
    emit(quiet, &rendered, out.as_deref()).map_or_else(|exit| exit, |_| code)
}

fn tool_available(
    process: &dyn ProcessRunner,
    repo_root: &Path,
    program: &str,
    args: &[&str],
) -> bool {
    let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    process
        .run_captured(program, &args, repo_root)
        .map(|capture| capture.success())
        .unwrap_or(false)
}

fn present(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "missing"
    }
}

/// Prints the rendered payload (unless quiet) and mirrors it to `--out` when
/// requested. Returns `Err(exit_code)` when the mirror write fails.
fn emit(quiet: bool, rendered: &str, out: Option<&Path>) -> Result<i32, i32> {
    if let Some(target) = out {
        if let Err(err) = std::fs::write(target, format!("{rendered}\n")) {
            eprintln!(
                "groundwork-verify: cannot write {}: {err}",
                target.display()
            );
            return Err(EXIT_INTERNAL);
        }
    }
    if !quiet {
        println!("{rendered}");
    }
    Ok(0)
}

fn log_event(quiet: bool, record: LogRecord) {
    if quiet {
        return;
    }
    if let Ok(line) = render_log(&record) {
        eprintln!("{line}");
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
