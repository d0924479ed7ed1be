use serde::Serialize;

use tilebatch_core::{LaunchConfig, PeId, TileError, TileResult, VirtualTileId};

/// Number of virtual tiles needed to cover `n` items.
pub fn tile_count(n: usize, elements_per_tile: usize) -> usize {
    n.div_ceil(elements_per_tile)
}

/// Minimum batch loop bound that reaches every tile on every PE.
pub fn required_batch_count(n: usize, elements_per_tile: usize, pe_count: usize) -> usize {
    tile_count(n, elements_per_tile).div_ceil(pe_count)
}

/// Index arithmetic for one launch over `n` items.
///
/// Only constructed from a validated [`LaunchConfig`], so every width is
/// positive and `lane_width` divides `elements_per_tile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileGeometry {
    pub n: usize,
    pub elements_per_tile: usize,
    pub lane_width: usize,
    pub pe_count: usize,
    pub sub_batch_bound: usize,
    pub pops_per_tile: usize,
    pub batch_count: usize,
}

impl TileGeometry {
    pub fn new(config: &LaunchConfig, n: usize) -> TileResult<Self> {
        config.validate()?;
        Ok(Self {
            n,
            elements_per_tile: config.elements_per_tile,
            lane_width: config.lane_width,
            pe_count: config.pe_count,
            sub_batch_bound: config.resolved_sub_batch_bound(),
            pops_per_tile: config.resolved_pops_per_tile(),
            batch_count: config.batch_count_for(n)?,
        })
    }

    pub fn tile_count(&self) -> usize {
        tile_count(self.n, self.elements_per_tile)
    }

    pub fn sub_batches_per_tile(&self) -> usize {
        self.elements_per_tile / self.lane_width
    }

    /// First flat index covered by tile `vt`.
    pub fn tile_base(&self, vt: VirtualTileId) -> usize {
        self.elements_per_tile * vt
    }

    /// Flat item index for a (lane, sub-batch, tile) triple.
    pub fn offset(&self, lane: usize, sub_batch: usize, vt: VirtualTileId) -> usize {
        lane + self.lane_width * sub_batch + self.elements_per_tile * vt
    }

    /// PE that runs tile `vt`.
    pub fn owner_of(&self, vt: VirtualTileId) -> PeId {
        vt % self.pe_count
    }

    /// Live tiles PE `pe` will see within the batch loop.
    pub fn live_tiles_for(&self, pe: PeId) -> usize {
        let tiles = self.tile_count();
        if pe >= tiles {
            0
        } else {
            (tiles - pe).div_ceil(self.pe_count).min(self.batch_count)
        }
    }

    /// Split `out[..n]` into tile chunks and hand each PE the chunks it owns,
    /// in increasing tile order. PE `p`'s `b`-th chunk is tile `p + b * P`.
    pub fn partition_output<'a, T>(&self, out: &'a mut [T]) -> TileResult<Vec<Vec<&'a mut [T]>>> {
        if out.len() < self.n {
            return Err(TileError::Config(format!(
                "output holds {} elements, launch needs {}",
                out.len(),
                self.n
            )));
        }
        let mut per_pe: Vec<Vec<&'a mut [T]>> = (0..self.pe_count).map(|_| Vec::new()).collect();
        for (vt, chunk) in out[..self.n].chunks_mut(self.elements_per_tile).enumerate() {
            per_pe[self.owner_of(vt)].push(chunk);
        }
        Ok(per_pe)
    }
}
