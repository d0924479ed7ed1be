pub mod kernel;
pub mod reference;
pub mod scheduler;

pub use kernel::{Binary, ElementKernel, FromIndex, Unary};
pub use scheduler::{
    BoundaryGuard, LaneDispatcher, LaunchOutcome, LaunchReport, Launcher, ParameterPlan, PeReport,
    PeState, TileBatchScheduler, TileGeometry,
};
