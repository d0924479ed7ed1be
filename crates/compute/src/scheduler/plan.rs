//! Producer-side bookkeeping for the parameter queues.
//!
//! A PE pops `pops_per_tile` indices for every live tile it owns and never
//! for a dead one. Feeding fewer entries than that stalls the PE forever;
//! feeding more leaves them queued after the PE retires.

use tilebatch_core::{PeId, TileError, TileResult};
use tilebatch_queue::ParameterProducer;

use super::types::TileGeometry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPlan {
    pops_per_tile: usize,
    live_tiles: Vec<usize>,
}

impl ParameterPlan {
    pub fn new(geometry: &TileGeometry) -> Self {
        Self {
            pops_per_tile: geometry.pops_per_tile,
            live_tiles: (0..geometry.pe_count)
                .map(|pe| geometry.live_tiles_for(pe))
                .collect(),
        }
    }

    /// Plan whose canonical stream writes every item of every live tile.
    ///
    /// Fewer pops than sub-batches per tile, or a bound below that count,
    /// leaves sub-batches that `0..pops_per_tile` never reaches. Such shapes
    /// only make sense with caller-supplied indices.
    pub fn covering(geometry: &TileGeometry) -> TileResult<Self> {
        let per_tile = geometry.sub_batches_per_tile();
        if geometry.pops_per_tile < per_tile {
            return Err(TileError::Config(format!(
                "pops_per_tile {} cannot cover the {per_tile} sub-batches in a tile; \
                 supply sub-batch indices with launch_with instead",
                geometry.pops_per_tile
            )));
        }
        if geometry.sub_batch_bound < per_tile {
            return Err(TileError::Config(format!(
                "sub_batch_bound {} skips part of the {per_tile} sub-batches in a tile; \
                 supply sub-batch indices with launch_with instead",
                geometry.sub_batch_bound
            )));
        }
        Ok(Self::new(geometry))
    }

    /// Exact number of pops PE `pe` will perform.
    pub fn pops_for(&self, pe: PeId) -> usize {
        self.live_tiles.get(pe).copied().unwrap_or(0) * self.pops_per_tile
    }

    pub fn total_pops(&self) -> usize {
        self.live_tiles.iter().sum::<usize>() * self.pops_per_tile
    }

    /// Canonical index stream for PE `pe`: `0..pops_per_tile` once per live
    /// tile.
    pub fn sequence_for(&self, pe: PeId) -> impl Iterator<Item = usize> {
        let per_tile = self.pops_per_tile;
        let tiles = self.live_tiles.get(pe).copied().unwrap_or(0);
        (0..tiles).flat_map(move |_| 0..per_tile)
    }

    /// Push the canonical stream for `pe` into its queue.
    pub fn feed(&self, pe: PeId, producer: &ParameterProducer<usize>) -> TileResult<()> {
        producer.extend(self.sequence_for(pe))?;
        Ok(())
    }
}
