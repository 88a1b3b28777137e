// SPDX-License-Identifier: Apache-2.0
//! `cli` defines argument parsing and the command surface.
//!
//! Boundary: `cli` parses/normalizes user input and dispatches into `core`;
//! it is the only module allowed to write to the terminal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

mod dispatch;

pub fn run() -> i32 {
    let cli = Cli::parse();
    dispatch::run_cli(cli)
}

#[derive(Parser, Debug)]
#[command(name = "groundwork-verify", version, disable_help_subcommand = true)]
#[command(about = "Static-analysis and manifest-validation harness for the Groundwork platform")]
pub struct Cli {
    /// Repository root; defaults to the current directory.
    #[arg(long)]
    pub repo_root: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run all three checks and print the aggregated report (the default).
    Run(RunArgs),
    /// Print the discovered file sets and manifest directories without
    /// running any tool.
    List {
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Probe the environment: repository root, git, and external tools.
    Doctor {
        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Emit CI fold markers around each check section.
    #[arg(long, default_value_t = false)]
    pub ci: bool,
    /// Retain rendered manifests and captured stderr under artifacts/verify/.
    #[arg(long, default_value_t = false)]
    pub debug: bool,
    /// Manifest-build worker override; defaults to a limit derived from CPU
    /// count.
    #[arg(long)]
    pub jobs: Option<usize>,
    #[arg(long = "lock-timeout-ms")]
    pub lock_timeout_ms: Option<u64>,
    #[arg(long)]
    pub run_id: Option<String>,
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[default]
    Text,
    Json,
    Jsonl,
}
