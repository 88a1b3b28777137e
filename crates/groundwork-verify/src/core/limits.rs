// SPDX-License-Identifier: Apache-2.0

use std::thread;

pub const MIN_WORKERS: usize = 2;
pub const MAX_WORKERS: usize = 8;

/// Worker-pool size for the manifest-build checker: half the CPUs, rounded
/// up, clamped to [2, 8]. Renders are subprocess-bound, so over-subscribing
/// buys nothing past the clamp.
pub fn concurrency_limit(cpu_count: usize) -> usize {
    let half = cpu_count.div_ceil(2);
    half.clamp(MIN_WORKERS, MAX_WORKERS)
}

pub fn detected_concurrency_limit() -> usize {
    let cpus = thread::available_parallelism().map_or(1, usize::from);
    concurrency_limit(cpus)
}
