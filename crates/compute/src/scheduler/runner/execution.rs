use rayon::prelude::*;
use tracing::info;

use tilebatch_core::{Completion, LaunchMode, TileError, TileResult};
use tilebatch_queue::{
    CompletionConsumer, CompletionSink, SubBatchSource, completion_queue, parameter_queue,
};

use crate::kernel::ElementKernel;
use crate::scheduler::batch::TileBatchScheduler;
use crate::scheduler::dispatch::LaneDispatcher;
use crate::scheduler::metrics::LaunchReport;
use crate::scheduler::pe::{PeRun, ProcessingElement};
use crate::scheduler::plan::ParameterPlan;

use super::Launcher;

/// Result of [`Launcher::launch`]: counters plus one completion consumer per
/// PE, indexed by PE id.
pub struct LaunchOutcome {
    pub report: LaunchReport,
    pub completions: Vec<CompletionConsumer>,
}

impl LaunchOutcome {
    /// Drain every PE's completion queue, in PE order.
    pub fn drain_completions(&self) -> Vec<Vec<Completion>> {
        self.completions.iter().map(CompletionConsumer::drain).collect()
    }
}

impl Launcher {
    /// Run `kernel` over `n` items with queues built and fed here.
    ///
    /// Each PE gets its own parameter queue holding the canonical sub-batch
    /// stream from [`ParameterPlan`]. Producers are dropped before the PEs
    /// start, so a PE that pops more than it was fed sees a disconnect
    /// instead of blocking.
    ///
    /// Shapes the canonical stream cannot cover (fewer pops or a lower bound
    /// than sub-batches per tile) are rejected; use [`Launcher::launch_with`]
    /// to drive them with explicit indices.
    pub fn launch<T, K>(&self, n: usize, kernel: &K, out: &mut [T]) -> TileResult<LaunchOutcome>
    where
        T: Send,
        K: ElementKernel<T> + ?Sized,
    {
        let geometry = self.geometry(n)?;
        let plan = ParameterPlan::covering(&geometry)?;
        let timeout = self.config.pop_timeout();

        let mut sources = Vec::with_capacity(geometry.pe_count);
        let mut sinks = Vec::with_capacity(geometry.pe_count);
        let mut completions = Vec::with_capacity(geometry.pe_count);
        for pe in 0..geometry.pe_count {
            let (producer, queue) = parameter_queue::<usize>();
            plan.feed(pe, &producer)?;
            sources.push(queue.with_timeout(timeout));

            let (sink, consumer) = completion_queue();
            sinks.push(sink);
            completions.push(consumer);
        }

        let report = self.launch_with(n, kernel, out, sources, sinks)?;
        Ok(LaunchOutcome {
            report,
            completions,
        })
    }

    /// Run `kernel` over `n` items with caller-supplied sources and sinks,
    /// one of each per PE, indexed by PE id.
    ///
    /// All configuration checks happen before any PE starts.
    pub fn launch_with<T, K, S, C>(
        &self,
        n: usize,
        kernel: &K,
        out: &mut [T],
        sources: Vec<S>,
        sinks: Vec<C>,
    ) -> TileResult<LaunchReport>
    where
        T: Send,
        K: ElementKernel<T> + ?Sized,
        S: SubBatchSource,
        C: CompletionSink,
    {
        let geometry = self.geometry(n)?;
        let pe_count = geometry.pe_count;
        if sources.len() != pe_count || sinks.len() != pe_count {
            return Err(TileError::Config(format!(
                "{pe_count} PEs need one source and one sink each, got {} sources and {} sinks",
                sources.len(),
                sinks.len()
            )));
        }
        if kernel.input_len() < n {
            return Err(TileError::Config(format!(
                "kernel input holds {} elements, launch needs {n}",
                kernel.input_len()
            )));
        }

        let dispatcher = LaneDispatcher::new(geometry);
        let pes: Vec<_> = geometry
            .partition_output(out)?
            .into_iter()
            .zip(sources)
            .zip(sinks)
            .enumerate()
            .map(|(pe, ((tiles, source), sink))| {
                let scheduler = TileBatchScheduler::for_pe(&geometry, pe);
                ProcessingElement::new(scheduler, tiles, source, sink)
            })
            .collect();

        info!(
            n,
            pe_count,
            tiles = geometry.tile_count(),
            batches = geometry.batch_count,
            pops_per_tile = geometry.pops_per_tile,
            mode = %self.config.mode,
            "launch starting"
        );

        let runs = match self.config.mode {
            LaunchMode::Parallel => self.run_parallel(pes, &dispatcher, kernel)?,
            LaunchMode::Sequential => self.run_sequential(pes, &dispatcher, kernel)?,
        };

        let mut report = LaunchReport::new(&geometry);
        for run in runs {
            report.record(run.report);
        }

        info!(
            n,
            lanes = report.total_lanes(),
            completions = report.total_completions(),
            live_tiles = report.total_live_tiles(),
            "launch finished"
        );
        Ok(report)
    }

    /// One rayon task per PE on a pool owned by this launch.
    fn run_parallel<T, K, S, C>(
        &self,
        pes: Vec<ProcessingElement<'_, T, S, C>>,
        dispatcher: &LaneDispatcher,
        kernel: &K,
    ) -> TileResult<Vec<PeRun<S, C>>>
    where
        T: Send,
        K: ElementKernel<T> + ?Sized,
        S: SubBatchSource,
        C: CompletionSink,
    {
        let threads = self.config.resolved_worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| {
                TileError::Config(format!("failed to build {threads}-thread worker pool: {e}"))
            })?;

        pool.install(|| {
            pes.into_par_iter()
                .with_max_len(1)
                .map(|pe| pe.run(dispatcher, kernel))
                .collect()
        })
    }

    /// PEs one after another on the calling thread, in `pe_order`.
    fn run_sequential<T, K, S, C>(
        &self,
        pes: Vec<ProcessingElement<'_, T, S, C>>,
        dispatcher: &LaneDispatcher,
        kernel: &K,
    ) -> TileResult<Vec<PeRun<S, C>>>
    where
        K: ElementKernel<T> + ?Sized,
        S: SubBatchSource,
        C: CompletionSink,
    {
        let mut pending: Vec<Option<_>> = pes.into_iter().map(Some).collect();
        let mut runs = Vec::with_capacity(pending.len());
        for &pe in &self.pe_order {
            let element = pending
                .get_mut(pe)
                .and_then(Option::take)
                .ok_or_else(|| TileError::Config(format!("PE {pe} is not schedulable")))?;
            runs.push(element.run(dispatcher, kernel)?);
        }
        Ok(runs)
    }
}
