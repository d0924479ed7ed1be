//! Tile-batch work distribution across a fixed array of processing elements.
//!
//! Each PE walks its batches in order (`vt = p + b * P`), skips tiles past
//! the data, pops sub-batch indices from its own parameter source, writes
//! the live lanes of each sub-batch and signals one completion per pop.
//! Output is split by tile ownership, so PEs never share a writable cell.

pub mod batch;
pub mod dispatch;
pub mod guard;
pub mod metrics;
pub mod pe;
pub mod plan;
pub mod runner;
pub mod state;
pub mod types;

pub use batch::TileBatchScheduler;
pub use dispatch::{LaneDispatcher, TileOutcome, TileSlot};
pub use guard::BoundaryGuard;
pub use metrics::{LaunchReport, PeReport};
pub use pe::{PeRun, ProcessingElement};
pub use plan::ParameterPlan;
pub use runner::{LaunchOutcome, Launcher};
pub use state::{Lifecycle, PeState};
pub use types::{TileGeometry, required_batch_count, tile_count};
