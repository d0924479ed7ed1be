//! Launch configuration: TOML, env overrides and the checks that run
//! before any PE starts.

use std::env;
use std::sync::Mutex;

use tilebatch_compute::{FromIndex, Launcher};
use tilebatch_core::{Completion, LaunchConfig, LaunchMode, TileError};
use tilebatch_queue::IterSource;

// Env-based tests must run serially to avoid interfering with each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const KEYS: [&str; 9] = [
    "TILEBATCH_PE_COUNT",
    "TILEBATCH_ELEMENTS_PER_TILE",
    "TILEBATCH_LANE_WIDTH",
    "TILEBATCH_SUB_BATCH_BOUND",
    "TILEBATCH_POPS_PER_TILE",
    "TILEBATCH_BATCH_COUNT",
    "TILEBATCH_POP_TIMEOUT_MS",
    "TILEBATCH_WORKER_THREADS",
    "TILEBATCH_MODE",
];

fn clear_tilebatch_env() {
    for k in KEYS {
        env::remove_var(k);
    }
}

#[test]
fn test_toml_drives_launch() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_tilebatch_env();

    let cfg = LaunchConfig::from_toml(
        r#"
        pe_count = 3
        elements_per_tile = 4
        lane_width = 2
        mode = "sequential"
        "#,
    )
    .unwrap();
    assert_eq!(cfg.mode, LaunchMode::Sequential);

    let launcher = Launcher::new(cfg).unwrap();
    let mut out = vec![0usize; 10];
    let outcome = launcher
        .launch(10, &FromIndex::new(|i: usize| i * i), &mut out)
        .unwrap();
    assert_eq!(out, (0..10).map(|i| i * i).collect::<Vec<_>>());
    assert_eq!(outcome.report.tile_count, 3);
}

#[test]
fn test_env_overrides_toml() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_tilebatch_env();

    env::set_var("TILEBATCH_PE_COUNT", "5");
    env::set_var("TILEBATCH_MODE", "sequential");
    let cfg = LaunchConfig::from_toml("pe_count = 2").unwrap();
    clear_tilebatch_env();

    assert_eq!(cfg.pe_count, 5);
    assert_eq!(cfg.mode, LaunchMode::Sequential);
}

#[test]
fn test_bad_env_value_is_config_error() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_tilebatch_env();

    env::set_var("TILEBATCH_LANE_WIDTH", "wide");
    let err = LaunchConfig::from_env().unwrap_err();
    clear_tilebatch_env();

    assert!(matches!(err, TileError::Config(ref m) if m.contains("TILEBATCH_LANE_WIDTH")));
}

#[test]
fn test_invalid_shapes_rejected_before_launch() {
    let bad = [
        LaunchConfig::new(0, 8, 2),
        LaunchConfig::new(2, 0, 2),
        LaunchConfig::new(2, 8, 0),
        LaunchConfig::new(2, 8, 3),
        LaunchConfig {
            sub_batch_bound: Some(5),
            ..LaunchConfig::new(2, 8, 2)
        },
        LaunchConfig {
            pops_per_tile: Some(0),
            ..LaunchConfig::new(2, 8, 2)
        },
    ];
    for cfg in bad {
        assert!(
            matches!(Launcher::new(cfg.clone()), Err(TileError::Config(_))),
            "{cfg:?}"
        );
    }
}

#[test]
fn test_short_batch_count_rejected_per_launch() {
    let launcher = Launcher::new(LaunchConfig {
        batch_count: Some(1),
        ..LaunchConfig::new(2, 8, 2)
    })
    .unwrap();

    let mut out = vec![0usize; 32];
    // 16 items fit in one batch, 17 do not.
    assert!(launcher.launch(16, &FromIndex::new(|i: usize| i), &mut out).is_ok());
    let err = launcher
        .launch(17, &FromIndex::new(|i: usize| i), &mut out)
        .err()
        .unwrap();
    assert!(matches!(err, TileError::Config(ref m) if m.contains("batch_count")));
}

#[test]
fn test_short_pop_count_rejected_by_launch() {
    let launcher = Launcher::new(LaunchConfig {
        pops_per_tile: Some(2),
        ..LaunchConfig::new(2, 8, 2)
    })
    .unwrap();

    let mut out = vec![usize::MAX; 16];
    let err = launcher
        .launch(16, &FromIndex::new(|i: usize| i), &mut out)
        .err()
        .unwrap();
    assert!(matches!(err, TileError::Config(ref m) if m.contains("pops_per_tile")));
    assert!(out.iter().all(|&v| v == usize::MAX), "a PE ran before the check");
}

#[test]
fn test_low_bound_rejected_by_launch() {
    let launcher = Launcher::new(LaunchConfig {
        sub_batch_bound: Some(2),
        ..LaunchConfig::new(1, 8, 2)
    })
    .unwrap();
    let mut out = vec![0usize; 8];
    let err = launcher
        .launch(8, &FromIndex::new(|i: usize| i), &mut out)
        .err()
        .unwrap();
    assert!(matches!(err, TileError::Config(ref m) if m.contains("sub_batch_bound")));
}

#[test]
fn test_short_pop_count_covers_with_explicit_indices() {
    // Two pops per tile, each pair of indices chosen by the caller.
    let launcher = Launcher::new(LaunchConfig {
        pops_per_tile: Some(2),
        mode: LaunchMode::Sequential,
        ..LaunchConfig::new(1, 4, 2)
    })
    .unwrap();
    let mut out = vec![usize::MAX; 8];
    let mut sink: Vec<Completion> = Vec::new();
    launcher
        .launch_with(
            8,
            &FromIndex::new(|i: usize| i),
            &mut out,
            vec![IterSource::new(vec![0, 1, 1, 0])],
            vec![&mut sink],
        )
        .unwrap();
    assert_eq!(out, (0..8).collect::<Vec<_>>());
    assert_eq!(sink.len(), 4);
}

#[test]
fn test_missing_config_file() {
    let err = LaunchConfig::from_file("/nonexistent/tilebatch.toml").unwrap_err();
    assert!(matches!(err, TileError::ConfigIo(_)));
}
