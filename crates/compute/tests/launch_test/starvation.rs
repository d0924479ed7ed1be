//! Under-fed or abandoned queues fail the launch instead of hanging it.

use tilebatch_compute::{FromIndex, Launcher};
use tilebatch_core::{LaunchConfig, TileError};
use tilebatch_queue::{ParameterQueue, completion_queue, parameter_queue};

use crate::helpers::{config, sequential};

fn timed(cfg: LaunchConfig, ms: u64) -> LaunchConfig {
    LaunchConfig {
        pop_timeout_ms: Some(ms),
        ..cfg
    }
}

#[test]
fn test_underfed_queue_times_out() {
    let cfg = sequential(timed(config(1, 8, 2), 50));
    let launcher = Launcher::new(cfg.clone()).unwrap();
    let (producer, queue) = parameter_queue::<usize>();
    producer.extend([0, 1]).unwrap();
    let (sink, consumer) = completion_queue();

    let mut out = vec![0usize; 8];
    let err = launcher
        .launch_with(
            8,
            &FromIndex::new(|i: usize| i),
            &mut out,
            vec![queue.with_timeout(cfg.pop_timeout())],
            vec![sink],
        )
        .unwrap_err();

    match err {
        TileError::QueueStarvation { pe, batch, reason } => {
            assert_eq!((pe, batch), (0, 0));
            assert!(reason.contains("timeout"), "{reason}");
        }
        other => panic!("expected starvation, got {other:?}"),
    }
    // The two pops that arrived were still acknowledged.
    assert_eq!(consumer.drain().len(), 2);
    assert_eq!(&out[..4], &[0, 1, 2, 3]);
    drop(producer);
}

#[test]
fn test_dropped_producer_is_starvation() {
    let launcher = Launcher::new(sequential(config(2, 8, 2))).unwrap();
    let mut sources: Vec<ParameterQueue<usize>> = Vec::new();
    for pe in 0..2 {
        let (producer, queue) = parameter_queue::<usize>();
        if pe == 0 {
            producer.extend(0..4).unwrap();
        }
        sources.push(queue);
    }
    let (s0, _c0) = completion_queue();
    let (s1, _c1) = completion_queue();

    let mut out = vec![0usize; 16];
    let kernel = FromIndex::new(|i: usize| i);
    let err = launcher
        .launch_with(16, &kernel, &mut out, sources, vec![s0, s1])
        .unwrap_err();
    match err {
        TileError::QueueStarvation { pe, reason, .. } => {
            assert_eq!(pe, 1);
            assert!(reason.contains("disconnected"), "{reason}");
        }
        other => panic!("expected starvation, got {other:?}"),
    }
}

#[test]
fn test_parallel_starvation_surfaces() {
    let cfg = timed(config(3, 8, 2), 20);
    let launcher = Launcher::new(cfg.clone()).unwrap();
    let mut producers = Vec::new();
    let mut sources = Vec::new();
    let mut sinks = Vec::new();
    let mut consumers = Vec::new();
    for _ in 0..3 {
        let (producer, queue) = parameter_queue::<usize>();
        producer.extend(0..3).unwrap();
        producers.push(producer);
        sources.push(queue.with_timeout(cfg.pop_timeout()));
        let (sink, consumer) = completion_queue();
        sinks.push(sink);
        consumers.push(consumer);
    }

    let mut out = vec![0usize; 24];
    let err = launcher
        .launch_with(24, &FromIndex::new(|i: usize| i), &mut out, sources, sinks)
        .unwrap_err();
    assert!(matches!(err, TileError::QueueStarvation { .. }));
}

#[test]
fn test_dropped_completion_consumer_fails_launch() {
    let launcher = Launcher::new(sequential(config(1, 8, 2))).unwrap();
    let (producer, queue) = parameter_queue::<usize>();
    producer.extend(0..4).unwrap();
    let (sink, consumer) = completion_queue();
    drop(consumer);

    let mut out = vec![0usize; 8];
    let err = launcher
        .launch_with(8, &FromIndex::new(|i: usize| i), &mut out, vec![queue], vec![sink])
        .unwrap_err();
    assert!(matches!(err, TileError::Queue(_)));
}
