use tilebatch_core::VirtualTileId;

use super::types::TileGeometry;

/// Range checks for the three nesting levels.
///
/// The predicates are independent: a live tile can still hold a
/// skipped sub-batch, and a live sub-batch can still run past `n` in the
/// tail tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryGuard {
    n: usize,
    tile_count: usize,
    sub_batch_bound: usize,
}

impl BoundaryGuard {
    pub fn new(geometry: &TileGeometry) -> Self {
        Self {
            n: geometry.n,
            tile_count: geometry.tile_count(),
            sub_batch_bound: geometry.sub_batch_bound,
        }
    }

    /// `vt < ceil(n / elements_per_tile)`.
    pub fn tile_live(&self, vt: VirtualTileId) -> bool {
        vt < self.tile_count
    }

    /// Popped index below the configured bound.
    pub fn sub_batch_live(&self, idx: usize) -> bool {
        idx < self.sub_batch_bound
    }

    /// `i < n`.
    pub fn lane_live(&self, i: usize) -> bool {
        i < self.n
    }
}
