use tilebatch_core::{PeId, VirtualTileId};

use super::types::TileGeometry;

/// Per-PE view of the batch loop: which virtual tile each batch maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBatchScheduler {
    pe: PeId,
    pe_count: usize,
    batch_count: usize,
}

impl TileBatchScheduler {
    pub fn new(pe: PeId, pe_count: usize, batch_count: usize) -> Self {
        Self {
            pe,
            pe_count,
            batch_count,
        }
    }

    pub fn for_pe(geometry: &TileGeometry, pe: PeId) -> Self {
        Self::new(pe, geometry.pe_count, geometry.batch_count)
    }

    pub fn pe(&self) -> PeId {
        self.pe
    }

    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// `vt = p + b * P`.
    pub fn virtual_tile(&self, batch: usize) -> VirtualTileId {
        self.pe + batch * self.pe_count
    }

    /// `(batch, virtual tile)` pairs in strictly increasing batch order.
    ///
    /// Tiles past the end of the data are still yielded; the tile guard
    /// discards them.
    pub fn batches(&self) -> impl Iterator<Item = (usize, VirtualTileId)> + '_ {
        (0..self.batch_count).map(move |b| (b, self.virtual_tile(b)))
    }
}
