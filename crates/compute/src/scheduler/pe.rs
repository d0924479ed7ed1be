use tracing::debug;

use tilebatch_core::{PeId, TileError, TileResult};
use tilebatch_queue::{CompletionSink, SubBatchSource};

use crate::kernel::ElementKernel;

use super::batch::TileBatchScheduler;
use super::dispatch::{LaneDispatcher, TileSlot};
use super::metrics::PeReport;
use super::state::{Lifecycle, PeState};

/// One physical processing element for the duration of a launch.
///
/// Owns the output chunks of its tiles (in batch order), its sub-batch
/// source and its completion sink. Nothing here is shared with other PEs.
pub struct ProcessingElement<'a, T, S, C> {
    scheduler: TileBatchScheduler,
    tiles: Vec<&'a mut [T]>,
    source: S,
    sink: C,
    lifecycle: Lifecycle,
}

impl<'a, T, S, C> ProcessingElement<'a, T, S, C>
where
    S: SubBatchSource,
    C: CompletionSink,
{
    pub fn new(scheduler: TileBatchScheduler, tiles: Vec<&'a mut [T]>, source: S, sink: C) -> Self {
        Self {
            lifecycle: Lifecycle::new(scheduler.pe()),
            scheduler,
            tiles,
            source,
            sink,
        }
    }

    /// Keep the full state history, readable through [`PeRun::lifecycle`].
    pub fn recording(mut self) -> Self {
        self.lifecycle = Lifecycle::recording(self.scheduler.pe());
        self
    }

    pub fn id(&self) -> PeId {
        self.scheduler.pe()
    }

    /// Run the batch loop to completion.
    pub fn run<K>(self, dispatcher: &LaneDispatcher, kernel: &K) -> TileResult<PeRun<S, C>>
    where
        K: ElementKernel<T> + ?Sized,
    {
        let Self {
            scheduler,
            tiles,
            mut source,
            mut sink,
            mut lifecycle,
        } = self;
        let pe = scheduler.pe();
        let guard = *dispatcher.guard();
        let mut report = PeReport::new(pe);
        let mut tiles = tiles.into_iter();

        lifecycle.advance(PeState::IteratingBatches);
        for (batch, vt) in scheduler.batches() {
            report.batches_iterated += 1;
            lifecycle.advance(PeState::EvaluatingTile);
            if !guard.tile_live(vt) {
                report.tiles_skipped += 1;
                lifecycle.advance(PeState::IteratingBatches);
                continue;
            }

            // Live tiles arrive in batch order, so the next chunk is this tile's.
            let out = tiles.next().ok_or(TileError::OutOfRange {
                pe,
                offset: dispatcher.geometry().tile_base(vt),
            })?;
            let slot = TileSlot { pe, batch, vt, out };
            let outcome =
                dispatcher.run_tile(slot, kernel, &mut source, &mut sink, &mut lifecycle)?;

            report.tiles_live += 1;
            report.sub_batches_popped += outcome.popped;
            report.sub_batches_skipped += outcome.skipped;
            report.lanes_processed += outcome.lanes;
            report.completions_signaled += outcome.popped;
            lifecycle.advance(PeState::IteratingBatches);
        }
        lifecycle.advance(PeState::Idle);

        debug!(
            pe,
            batches = report.batches_iterated,
            tiles = report.tiles_live,
            lanes = report.lanes_processed,
            completions = report.completions_signaled,
            "PE retired"
        );

        Ok(PeRun {
            report,
            source,
            sink,
            lifecycle,
        })
    }
}

/// A retired PE: its counters plus the source and sink handed back.
pub struct PeRun<S, C> {
    pub report: PeReport,
    pub source: S,
    pub sink: C,
    pub lifecycle: Lifecycle,
}
