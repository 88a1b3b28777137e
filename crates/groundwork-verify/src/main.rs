// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

fn main() {
    std::process::exit(groundwork_verify::cli::run());
}
