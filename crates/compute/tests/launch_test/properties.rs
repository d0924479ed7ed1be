//! Property tests over random shapes.

use proptest::prelude::*;

use tilebatch_compute::reference;
use tilebatch_compute::{Launcher, Unary};
use tilebatch_core::{LaunchConfig, LaunchMode};

use crate::helpers::count_dispatches;

/// (pe_count, elements_per_tile, lane_width) with lane_width dividing the tile.
fn shape_strategy() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..6, 1usize..5, 0usize..3).prop_map(|(pe, sub_batches, lane_pow)| {
        let lane = 1 << lane_pow;
        (pe, sub_batches * lane, lane)
    })
}

proptest! {
    #[test]
    fn test_every_item_dispatched_once(
        (pe, tile, lane) in shape_strategy(),
        n in 0usize..200,
        extra_batches in 0usize..3,
    ) {
        let base = LaunchConfig::new(pe, tile, lane);
        let required = base.batch_count_for(n).unwrap();
        let launcher = Launcher::new(LaunchConfig {
            batch_count: Some(required + extra_batches).filter(|&c| c > 0),
            ..base
        })
        .unwrap();

        let hits = count_dispatches(&launcher, n);
        prop_assert!(hits[..n].iter().all(|&h| h == 1));
        prop_assert_eq!(hits[n], 0);
    }

    #[test]
    fn test_matches_host_reference(
        (pe, tile, lane) in shape_strategy(),
        input in prop::collection::vec(-1000i64..1000, 0..150),
        sequential in any::<bool>(),
    ) {
        let mode = if sequential { LaunchMode::Sequential } else { LaunchMode::Parallel };
        let launcher = Launcher::new(LaunchConfig {
            mode,
            ..LaunchConfig::new(pe, tile, lane)
        })
        .unwrap();

        let mut out = vec![0i64; input.len()];
        launcher
            .launch(input.len(), &Unary::new(&input, |x: i64| 3 * x - 1), &mut out)
            .unwrap();
        prop_assert_eq!(out, reference::map(&input, |x| 3 * x - 1));
    }
}
