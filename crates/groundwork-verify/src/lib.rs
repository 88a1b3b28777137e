// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::print_stdout, clippy::print_stderr)]

pub mod adapters;
// `cli` owns the terminal; everything else must stay silent and buffered.
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub mod cli;
pub mod core;
pub mod model;
pub mod ports;
