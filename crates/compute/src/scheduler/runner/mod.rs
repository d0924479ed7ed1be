//! Launcher -- turns a config, a kernel and an output buffer into PE runs.
//!
//! Split into focused submodules:
//! - `core`: Launcher struct, validation and PE order
//! - `execution`: queue setup, parallel and sequential launches

mod core;
mod execution;

pub use self::core::Launcher;
pub use self::execution::LaunchOutcome;
