// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Run-lifecycle logging. Records are JSON lines on stderr, keyed by a
//! stable code and the run id, so they never interleave with the report on
//! stdout.

use crate::model::{RunId, CONTRACT_SCHEMA_VERSION};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Lifecycle records (`RUN_START`, `RUN_DONE`), emitted in debug mode.
    Debug,
    /// A check failed; the detail lives in the report.
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub schema_version: u64,
    pub level: LogLevel,
    pub code: String,
    pub run_id: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(
        level: LogLevel,
        code: impl Into<String>,
        run_id: &RunId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: CONTRACT_SCHEMA_VERSION,
            level,
            code: code.into(),
            run_id: run_id.as_str().to_string(),
            message: message.into(),
        }
    }
}

pub fn render_log(record: &LogRecord) -> Result<String, String> {
    serde_json::to_string(record).map_err(|err| err.to_string())
}
