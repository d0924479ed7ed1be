use std::sync::atomic::{AtomicUsize, Ordering};

use tilebatch_compute::{FromIndex, LaunchOutcome, Launcher, Unary};
use tilebatch_core::{LaunchConfig, LaunchMode};

pub fn config(pe_count: usize, elements_per_tile: usize, lane_width: usize) -> LaunchConfig {
    LaunchConfig::new(pe_count, elements_per_tile, lane_width)
}

pub fn sequential(mut config: LaunchConfig) -> LaunchConfig {
    config.mode = LaunchMode::Sequential;
    config
}

/// Launch `f(x) = 2x` over input `0..n` and return the output.
pub fn run_doubling(config: LaunchConfig, n: usize) -> (Vec<i64>, LaunchOutcome) {
    let input: Vec<i64> = (0..n as i64).collect();
    let mut out = vec![0i64; n];
    let launcher = Launcher::new(config).unwrap();
    let outcome = launcher
        .launch(n, &Unary::new(&input, |x: i64| 2 * x), &mut out)
        .unwrap();
    (out, outcome)
}

/// Count how many times each offset is dispatched. Offsets at or past
/// `counters.len()` land in the last slot so overruns still show up.
pub fn count_dispatches(launcher: &Launcher, n: usize) -> Vec<usize> {
    let hits: Vec<AtomicUsize> = (0..=n).map(|_| AtomicUsize::new(0)).collect();
    let kernel = FromIndex::new(|i: usize| {
        hits[i.min(n)].fetch_add(1, Ordering::Relaxed);
        i
    });
    let mut out = vec![usize::MAX; n];
    launcher.launch(n, &kernel, &mut out).unwrap();
    hits.into_iter().map(AtomicUsize::into_inner).collect()
}
