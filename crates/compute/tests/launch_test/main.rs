//! Integration tests for tilebatch-compute.
//!
//! Drive the launcher end to end: real channels, real worker pools, and the
//! index arithmetic checked from the outside through the produced output and
//! the completion streams.

mod config;
mod helpers;
mod properties;
mod scenario;
mod starvation;
