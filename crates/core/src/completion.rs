use serde::{Deserialize, Serialize};

/// Processing element identifier, `0..pe_count`.
pub type PeId = usize;

/// Virtual tile identifier, `0..ceil(N / elements_per_tile)`.
pub type VirtualTileId = usize;

/// Acknowledgment a PE pushes after retiring one popped sub-batch slot.
///
/// One is emitted per pop whether or not the sub-batch was live, so
/// `lanes_processed` can be anything from 0 to `lane_width`. Consumers must
/// not read a completion as "one full sub-batch of output".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub pe: PeId,
    /// Batch counter of the PE when the sub-batch was popped.
    pub batch: usize,
    pub virtual_tile: VirtualTileId,
    /// Index exactly as popped from the parameter queue.
    pub sub_batch: usize,
    pub lanes_processed: usize,
}

impl Completion {
    /// Whether the popped index passed the sub-batch guard and wrote anything.
    pub fn did_work(&self) -> bool {
        self.lanes_processed > 0
    }
}
