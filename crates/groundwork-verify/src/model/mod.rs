// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! `model` defines serde-facing report and identifier types shared across the crate.
//!
//! Boundary: model is a leaf module; it must not depend on `core`, `cli`, or `adapters`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CONTRACT_SCHEMA_VERSION: u64 = 1;
pub const fn schema_version() -> u64 {
    CONTRACT_SCHEMA_VERSION
}

fn is_lower_snake(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// One of the three concurrent validation tasks. The variant order is the
/// fixed report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Markdown,
    Shell,
    ManifestBuild,
}

impl CheckKind {
    pub const REPORT_ORDER: [Self; 3] = [Self::Markdown, Self::Shell, Self::ManifestBuild];

    pub fn title(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Shell => "Shell",
            Self::ManifestBuild => "Manifest-build",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Shell => "shell",
            Self::ManifestBuild => "manifest_build",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Failed,
    Skipped,
}

impl CheckStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }

    /// Skipped counts as success for the process exit code: an empty input
    /// set is not an error.
    pub fn passes_gate(self) -> bool {
        matches!(self, Self::Ok | Self::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestRole {
    Base,
    Overlay,
}

/// A directory directly containing a kustomization descriptor. Role is
/// inferred structurally: a directory literally named `base` is a base,
/// everything else is treated as an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDirectory {
    pub path: PathBuf,
    pub role: ManifestRole,
}

impl ManifestDirectory {
    pub fn new(path: PathBuf) -> Self {
        let role = if path.file_name().is_some_and(|name| name == "base") {
            ManifestRole::Base
        } else {
            ManifestRole::Overlay
        };
        Self { path, role }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFailure {
    #[serde(default = "schema_version")]
    pub schema_version: u64,
    pub directory: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    #[serde(default = "schema_version")]
    pub schema_version: u64,
    pub kind: CheckKind,
    pub status: CheckStatus,
    /// Buffered combined output of the external tool; only flushed to the
    /// terminal by the aggregator, never mid-run.
    pub output: String,
    pub failures: Vec<ManifestFailure>,
    pub duration_ms: u64,
}

impl CheckOutcome {
    pub fn skipped(kind: CheckKind) -> Self {
        Self {
            schema_version: schema_version(),
            kind,
            status: CheckStatus::Skipped,
            output: String::new(),
            failures: Vec::new(),
            duration_ms: 0,
        }
    }
}

/// Output framing and artifact retention switches. Replaces the source
/// system's `CI`/`DEBUG` environment variables with explicit configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunModes {
    pub ci_mode: bool,
    pub debug_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn parse(value: &str) -> Result<Self, String> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err("run id cannot be empty".to_string());
        }
        if !is_lower_snake(raw) {
            return Err(format!(
                "invalid run id `{raw}`: expected lowercase snake_case"
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn from_seed(seed: &str) -> Self {
        let mut out = String::with_capacity(seed.len());
        for c in seed.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
            } else {
                out.push('_');
            }
        }
        let compact = out
            .split('_')
            .filter(|seg| !seg.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if compact.is_empty() {
            return Self("run".to_string());
        }
        Self(compact)
    }

    pub fn generate(timestamp_unix_secs: u64) -> Self {
        Self::from_seed(&format!("verify_t{timestamp_unix_secs}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "schema_version")]
    pub schema_version: u64,
    pub ok: u64,
    pub failed: u64,
    pub skipped: u64,
    pub total: u64,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[CheckOutcome]) -> Self {
        Self {
            schema_version: schema_version(),
            ok: outcomes
                .iter()
                .filter(|row| row.status == CheckStatus::Ok)
                .count() as u64,
            failed: outcomes
                .iter()
                .filter(|row| row.status == CheckStatus::Failed)
                .count() as u64,
            skipped: outcomes
                .iter()
                .filter(|row| row.status == CheckStatus::Skipped)
                .count() as u64,
            total: outcomes.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default = "schema_version")]
    pub schema_version: u64,
    pub run_id: RunId,
    pub repo_root: String,
    pub command: String,
    pub modes: RunModes,
    pub workers: u64,
    pub outcomes: Vec<CheckOutcome>,
    pub durations_ms: BTreeMap<String, u64>,
    pub summary: RunSummary,
}

pub fn report_json_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "groundwork-verify run report",
        "type": "object",
        "required": ["schema_version", "run_id", "repo_root", "command", "modes", "workers", "outcomes", "durations_ms", "summary"],
        "properties": {
            "schema_version": {"type": "integer", "const": CONTRACT_SCHEMA_VERSION},
            "run_id": {"type": "string"},
            "repo_root": {"type": "string"},
            "command": {"type": "string"},
            "modes": {"type": "object"},
            "workers": {"type": "integer", "minimum": 1},
            "outcomes": {"type": "array"},
            "durations_ms": {"type": "object", "additionalProperties": {"type": "integer", "minimum": 0}},
            "summary": {"type": "object"}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_validation_and_seed() {
        assert!(RunId::parse("stable_run").is_ok());
        assert!(RunId::parse("stable-run").is_err());
        assert!(RunId::parse("").is_err());
        let seeded = RunId::from_seed("Verify: Nightly Run 001");
        assert_eq!(seeded.as_str(), "verify_nightly_run_001");
    }

    #[test]
    fn role_is_inferred_from_directory_name() {
        let base = ManifestDirectory::new(PathBuf::from("bootstrap/cni/base"));
        assert_eq!(base.role, ManifestRole::Base);
        let overlay = ManifestDirectory::new(PathBuf::from("bootstrap/cni/dev"));
        assert_eq!(overlay.role, ManifestRole::Overlay);
    }

    #[test]
    fn skipped_passes_the_exit_gate() {
        assert!(CheckStatus::Ok.passes_gate());
        assert!(CheckStatus::Skipped.passes_gate());
        assert!(!CheckStatus::Failed.passes_gate());
    }

    #[test]
    fn summary_counts_outcomes_by_status() {
        let mut failed = CheckOutcome::skipped(CheckKind::Shell);
        failed.status = CheckStatus::Failed;
        let outcomes = vec![
            CheckOutcome::skipped(CheckKind::Markdown),
            failed,
            CheckOutcome {
                status: CheckStatus::Ok,
                ..CheckOutcome::skipped(CheckKind::ManifestBuild)
            },
        ];
        let summary = RunSummary::from_outcomes(&outcomes);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn report_order_is_markdown_shell_manifest() {
        assert_eq!(
            CheckKind::REPORT_ORDER,
            [
                CheckKind::Markdown,
                CheckKind::Shell,
                CheckKind::ManifestBuild
            ]
        );
    }

    #[test]
    fn report_schema_contains_required_fields() {
        let schema = report_json_schema();
        let required = schema.get("required").map(Value::to_string).unwrap_or_default();
        assert!(required.contains("run_id"));
        assert!(required.contains("outcomes"));
        assert!(required.contains("summary"));
        assert!(required.contains("schema_version"));
    }
}
