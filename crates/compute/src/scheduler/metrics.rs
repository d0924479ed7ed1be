use serde::Serialize;

use tilebatch_core::PeId;

use super::types::TileGeometry;

/// Counters for one PE over one launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeReport {
    pub pe: PeId,
    /// Iterations of the batch loop, live or not.
    pub batches_iterated: usize,
    pub tiles_live: usize,
    /// Batches whose virtual tile fell past the data.
    pub tiles_skipped: usize,
    pub sub_batches_popped: usize,
    /// Popped indices rejected by the sub-batch guard.
    pub sub_batches_skipped: usize,
    pub lanes_processed: usize,
    pub completions_signaled: usize,
}

impl PeReport {
    pub fn new(pe: PeId) -> Self {
        Self {
            pe,
            ..Self::default()
        }
    }
}

/// Aggregated counters for a whole launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchReport {
    pub n: usize,
    pub pe_count: usize,
    pub tile_count: usize,
    pub batch_count: usize,
    /// Indexed by PE id.
    pub per_pe: Vec<PeReport>,
}

impl LaunchReport {
    pub fn new(geometry: &TileGeometry) -> Self {
        Self {
            n: geometry.n,
            pe_count: geometry.pe_count,
            tile_count: geometry.tile_count(),
            batch_count: geometry.batch_count,
            per_pe: Vec::with_capacity(geometry.pe_count),
        }
    }

    /// Record a PE's counters, keeping `per_pe` ordered by PE id.
    pub fn record(&mut self, report: PeReport) {
        let pos = self.per_pe.partition_point(|r| r.pe < report.pe);
        self.per_pe.insert(pos, report);
    }

    pub fn total_lanes(&self) -> usize {
        self.per_pe.iter().map(|r| r.lanes_processed).sum()
    }

    pub fn total_completions(&self) -> usize {
        self.per_pe.iter().map(|r| r.completions_signaled).sum()
    }

    pub fn total_pops(&self) -> usize {
        self.per_pe.iter().map(|r| r.sub_batches_popped).sum()
    }

    pub fn total_live_tiles(&self) -> usize {
        self.per_pe.iter().map(|r| r.tiles_live).sum()
    }

    pub fn pe(&self, pe: PeId) -> Option<&PeReport> {
        self.per_pe.iter().find(|r| r.pe == pe)
    }
}
