use tracing::info;

use tilebatch_core::{LaunchConfig, PeId, TileError, TileResult};

use crate::scheduler::types::TileGeometry;

/// Launches element-wise kernels over a fixed array of processing elements.
///
/// The config is validated once here; every launch then only derives the
/// per-`n` geometry.
#[derive(Debug, Clone)]
pub struct Launcher {
    pub(super) config: LaunchConfig,
    /// Order in which PEs run in sequential mode.
    pub(super) pe_order: Vec<PeId>,
}

impl Launcher {
    pub fn new(config: LaunchConfig) -> TileResult<Self> {
        config.validate()?;
        let pe_order = (0..config.pe_count).collect();
        info!(
            pe_count = config.pe_count,
            elements_per_tile = config.elements_per_tile,
            lane_width = config.lane_width,
            mode = %config.mode,
            "launcher ready"
        );
        Ok(Self { config, pe_order })
    }

    /// Run PEs in this order when the mode is sequential. Must be a
    /// permutation of `0..pe_count`.
    pub fn with_pe_order(mut self, order: Vec<PeId>) -> TileResult<Self> {
        let mut seen = vec![false; self.config.pe_count];
        for &pe in &order {
            match seen.get_mut(pe) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(TileError::Config(format!(
                        "PE order {order:?} is not a permutation of 0..{}",
                        self.config.pe_count
                    )));
                }
            }
        }
        if order.len() != self.config.pe_count {
            return Err(TileError::Config(format!(
                "PE order has {} entries, expected {}",
                order.len(),
                self.config.pe_count
            )));
        }
        self.pe_order = order;
        Ok(self)
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn pe_order(&self) -> &[PeId] {
        &self.pe_order
    }

    /// Geometry of a launch over `n` items.
    pub fn geometry(&self, n: usize) -> TileResult<TileGeometry> {
        TileGeometry::new(&self.config, n)
    }
}
