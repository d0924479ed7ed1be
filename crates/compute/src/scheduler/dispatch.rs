//! Sub-batch and lane iteration inside one live tile.

use tracing::trace;

use tilebatch_core::{Completion, PeId, TileError, TileResult, VirtualTileId};
use tilebatch_queue::{CompletionSink, QueueError, SubBatchSource};

use crate::kernel::ElementKernel;

use super::guard::BoundaryGuard;
use super::state::{Lifecycle, PeState};
use super::types::TileGeometry;

/// A live tile as seen by the PE that owns it.
pub struct TileSlot<'t, T> {
    pub pe: PeId,
    pub batch: usize,
    pub vt: VirtualTileId,
    /// Output chunk starting at `tile_base(vt)`.
    pub out: &'t mut [T],
}

/// What happened while retiring one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileOutcome {
    pub popped: usize,
    pub skipped: usize,
    pub lanes: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct LaneDispatcher {
    geometry: TileGeometry,
    guard: BoundaryGuard,
}

impl LaneDispatcher {
    pub fn new(geometry: TileGeometry) -> Self {
        Self {
            guard: BoundaryGuard::new(&geometry),
            geometry,
        }
    }

    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    pub fn guard(&self) -> &BoundaryGuard {
        &self.guard
    }

    /// Flat offsets of `sub_batch` in tile `vt` that pass the lane guard.
    /// Empty for an index at or above the sub-batch bound, so no offset is
    /// ever computed from it.
    pub fn live_offsets(
        &self,
        vt: VirtualTileId,
        sub_batch: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        let lanes = if self.guard.sub_batch_live(sub_batch) {
            self.geometry.lane_width
        } else {
            0
        };
        (0..lanes)
            .map(move |lane| self.geometry.offset(lane, sub_batch, vt))
            .filter(move |&i| self.guard.lane_live(i))
    }

    /// Write every live lane of one sub-batch into the tile's output chunk.
    /// Returns the number of lanes written; 0 for a skipped index.
    pub fn dispatch<T, K>(
        &self,
        slot: &mut TileSlot<'_, T>,
        sub_batch: usize,
        kernel: &K,
    ) -> TileResult<usize>
    where
        K: ElementKernel<T> + ?Sized,
    {
        let base = self.geometry.tile_base(slot.vt);
        let pe = slot.pe;
        let mut lanes = 0;
        for offset in self.live_offsets(slot.vt, sub_batch) {
            let cell = offset
                .checked_sub(base)
                .and_then(|local| slot.out.get_mut(local))
                .ok_or(TileError::OutOfRange { pe, offset })?;
            *cell = kernel.eval(offset);
            lanes += 1;
        }
        Ok(lanes)
    }

    /// Pop `pops_per_tile` sub-batch indices, dispatch the live ones, and
    /// push one completion after every pop.
    pub fn run_tile<T, K, S, C>(
        &self,
        mut slot: TileSlot<'_, T>,
        kernel: &K,
        source: &mut S,
        sink: &mut C,
        lifecycle: &mut Lifecycle,
    ) -> TileResult<TileOutcome>
    where
        K: ElementKernel<T> + ?Sized,
        S: SubBatchSource + ?Sized,
        C: CompletionSink + ?Sized,
    {
        let mut outcome = TileOutcome::default();
        for _ in 0..self.geometry.pops_per_tile {
            lifecycle.advance(PeState::PoppingSubBatch);
            let sub_batch = match source.next_sub_batch() {
                Ok(Some(idx)) => idx,
                Ok(None) => {
                    return Err(TileError::QueueStarvation {
                        pe: slot.pe,
                        batch: slot.batch,
                        reason: QueueError::Exhausted.to_string(),
                    });
                }
                Err(e) => {
                    return Err(TileError::QueueStarvation {
                        pe: slot.pe,
                        batch: slot.batch,
                        reason: e.to_string(),
                    });
                }
            };
            outcome.popped += 1;

            let lanes = if self.guard.sub_batch_live(sub_batch) {
                lifecycle.advance(PeState::Dispatching);
                self.dispatch(&mut slot, sub_batch, kernel)?
            } else {
                lifecycle.advance(PeState::Skipping);
                outcome.skipped += 1;
                0
            };
            outcome.lanes += lanes;
            trace!(pe = slot.pe, vt = slot.vt, sub_batch, lanes, "sub-batch retired");

            lifecycle.advance(PeState::SignalingCompletion);
            sink.signal(Completion {
                pe: slot.pe,
                batch: slot.batch,
                virtual_tile: slot.vt,
                sub_batch,
                lanes_processed: lanes,
            })?;
        }
        Ok(outcome)
    }
}
