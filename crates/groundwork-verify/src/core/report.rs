// SPDX-License-Identifier: Apache-2.0

use crate::model::{CheckOutcome, CheckStatus, RunReport};

pub fn render_text_summary(report: &RunReport) -> String {
    format!(
        "summary: ok={} failed={} skipped={} total={} duration_ms={}",
        report.summary.ok,
        report.summary.failed,
        report.summary.skipped,
        report.summary.total,
        report.durations_ms.values().sum::<u64>(),
    )
}

fn check_lines(outcome: &CheckOutcome) -> Vec<String> {
    let mut lines = vec![format!("{}: {}", outcome.kind.title(), outcome.status.label())];
    if outcome.status != CheckStatus::Failed {
        return lines;
    }
    for line in outcome.output.lines() {
        lines.push(format!("  {line}"));
    }
    for failure in &outcome.failures {
        lines.push(format!("  failed directory: {}", failure.directory));
        for line in failure.detail.lines() {
            lines.push(format!("    {line}"));
        }
    }
    lines
}

/// Plain aggregation pass: fixed check order, failure detail inlined under
/// each failed check, one summary line at the end.
pub fn render_text(report: &RunReport) -> String {
    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        lines.extend(check_lines(outcome));
    }
    lines.push(render_text_summary(report));
    lines.join("\n")
}

/// CI framing wraps each check in fold markers so build logs collapse per
/// check.
pub fn render_ci_text(report: &RunReport) -> String {
    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        lines.push(format!("::group::{}", outcome.kind.title()));
        lines.extend(check_lines(outcome));
        lines.push("::endgroup::".to_string());
    }
    lines.push(render_text_summary(report));
    lines.join("\n")
}

pub fn render_json(report: &RunReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|err| err.to_string())
}

pub fn render_jsonl(report: &RunReport) -> Result<String, String> {
    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        lines.push(serde_json::to_string(outcome).map_err(|err| err.to_string())?);
    }
    Ok(lines.join("\n"))
}

/// 0 iff every check is ok or skipped; 1 otherwise.
pub fn exit_code_for_report(report: &RunReport) -> i32 {
    if report
        .outcomes
        .iter()
        .all(|outcome| outcome.status.passes_gate())
    {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        schema_version, CheckKind, ManifestFailure, RunId, RunModes, RunSummary,
    };
    use std::collections::BTreeMap;

    fn report_with(outcomes: Vec<CheckOutcome>) -> RunReport {
        let summary = RunSummary::from_outcomes(&outcomes);
        RunReport {
            schema_version: schema_version(),
            run_id: RunId::from_seed("report_test"),
            repo_root: "/repo".to_string(),
            command: "groundwork-verify run".to_string(),
            modes: RunModes::default(),
            workers: 2,
            durations_ms: BTreeMap::new(),
            outcomes,
            summary,
        }
    }

    fn failed_manifest_outcome() -> CheckOutcome {
        CheckOutcome {
            status: CheckStatus::Failed,
            failures: vec![ManifestFailure {
                schema_version: schema_version(),
                directory: "x/overlay".to_string(),
                detail: "error: accumulating resources".to_string(),
            }],
            ..CheckOutcome::skipped(CheckKind::ManifestBuild)
        }
    }

    #[test]
    fn text_report_keeps_the_fixed_check_order() {
        let report = report_with(vec![
            CheckOutcome::skipped(CheckKind::Markdown),
            CheckOutcome::skipped(CheckKind::Shell),
            CheckOutcome::skipped(CheckKind::ManifestBuild),
        ]);
        let text = render_text(&report);
        let md = text.find("Markdown: SKIPPED").expect("markdown line");
        let sh = text.find("Shell: SKIPPED").expect("shell line");
        let mb = text.find("Manifest-build: SKIPPED").expect("manifest line");
        assert!(md < sh && sh < mb);
    }

    #[test]
    fn failure_detail_is_inlined_under_the_failed_check() {
        let report = report_with(vec![failed_manifest_outcome()]);
        let text = render_text(&report);
        assert!(text.contains("Manifest-build: FAILED"));
        assert!(text.contains("  failed directory: x/overlay"));
        assert!(text.contains("    error: accumulating resources"));
    }

    #[test]
    fn ok_checks_do_not_leak_buffered_output() {
        let ok = CheckOutcome {
            status: CheckStatus::Ok,
            output: "files scanned: 12\n".to_string(),
            ..CheckOutcome::skipped(CheckKind::Markdown)
        };
        let text = render_text(&report_with(vec![ok]));
        assert!(text.contains("Markdown: OK"));
        assert!(!text.contains("files scanned"));
    }

    #[test]
    fn ci_text_frames_each_check_in_fold_markers() {
        let report = report_with(vec![CheckOutcome::skipped(CheckKind::Shell)]);
        let text = render_ci_text(&report);
        assert!(text.contains("::group::Shell"));
        assert!(text.contains("::endgroup::"));
    }

    #[test]
    fn exit_code_is_zero_only_for_ok_and_skipped() {
        let passing = report_with(vec![
            CheckOutcome {
                status: CheckStatus::Ok,
                ..CheckOutcome::skipped(CheckKind::Markdown)
            },
            CheckOutcome::skipped(CheckKind::Shell),
        ]);
        assert_eq!(exit_code_for_report(&passing), 0);

        let failing = report_with(vec![failed_manifest_outcome()]);
        assert_eq!(exit_code_for_report(&failing), 1);
    }

    #[test]
    fn jsonl_emits_one_row_per_check() {
        let report = report_with(vec![
            CheckOutcome::skipped(CheckKind::Markdown),
            CheckOutcome::skipped(CheckKind::Shell),
        ]);
        let jsonl = render_jsonl(&report).expect("jsonl");
        assert_eq!(jsonl.lines().count(), 2);
    }
}
