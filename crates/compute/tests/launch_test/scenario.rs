//! The worked examples: an exact fit and a ragged tail.

use tilebatch_compute::Launcher;

use crate::helpers::{config, count_dispatches, run_doubling};

#[test]
fn test_two_tiles_two_pes_doubling() {
    let (out, outcome) = run_doubling(config(2, 8, 2), 16);

    assert_eq!(out, (0..16).map(|x| 2 * x).collect::<Vec<i64>>());
    assert_eq!(outcome.report.tile_count, 2);
    assert_eq!(outcome.report.batch_count, 1);

    let drained = outcome.drain_completions();
    for (pe, signals) in drained.iter().enumerate() {
        let subs: Vec<usize> = signals.iter().map(|c| c.sub_batch).collect();
        assert_eq!(subs, vec![0, 1, 2, 3], "PE {pe}");
        assert!(signals.iter().all(|c| c.virtual_tile == pe && c.batch == 0));
        assert!(signals.iter().all(|c| c.lanes_processed == 2));
    }
}

#[test]
fn test_ragged_tail_dispatches_each_item_once() {
    let launcher = Launcher::new(config(2, 8, 2)).unwrap();
    let hits = count_dispatches(&launcher, 13);
    assert_eq!(&hits[..13], &[1; 13]);
    assert_eq!(hits[13], 0, "offset past n was dispatched");
}

#[test]
fn test_ragged_tail_signals_dead_lanes() {
    let (out, outcome) = run_doubling(config(2, 8, 2), 13);
    assert_eq!(out, (0..13).map(|x| 2 * x).collect::<Vec<i64>>());

    let drained = outcome.drain_completions();
    let tail: Vec<usize> = drained[1].iter().map(|c| c.lanes_processed).collect();
    // Tile 1 covers 8..16: sub-batches 8..10, 10..12, 12..14, 14..16
    assert_eq!(tail, vec![2, 2, 1, 0]);
    assert!(!drained[1][3].did_work());
}

#[test]
fn test_single_item() {
    let (out, outcome) = run_doubling(config(4, 8, 2), 1);
    assert_eq!(out, vec![0]);
    assert_eq!(outcome.report.total_lanes(), 1);
    // Only PE0 owns a live tile.
    assert_eq!(outcome.report.total_completions(), 4);
    assert_eq!(outcome.report.pe(3).unwrap().completions_signaled, 0);
}
