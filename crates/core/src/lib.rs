//! Trace-driven cache hierarchy simulator library.
//!
//! This crate simulates a configurable two-level, set-associative memory
//! cache hierarchy with a write-back, write-allocate policy and true LRU
//! replacement. It provides:
//! 1. **Engine:** Address decomposition, hit/miss resolution, LRU victim
//!    selection, dirty writebacks, and miss forwarding ([`cache`]).
//! 2. **Driver:** L1-plus-optional-L2 wiring fed one trace entry at a time
//!    ([`hierarchy`]).
//! 3. **Input:** Streaming trace tokenizing with fatal-error reporting
//!    ([`trace`]).
//! 4. **Output:** Per-level counters, contents snapshots, and the final
//!    fixed-column report ([`stats`]).
//! 5. **Configuration:** Geometry parameters with serde support and fatal
//!    validation ([`config`]).

/// Set-associative cache engine (geometry, lines, access resolution).
pub mod cache;
/// Simulation configuration (defaults, geometry parameters, errors).
pub mod config;
/// Two-level hierarchy driver.
pub mod hierarchy;
/// Access counters and report formatting.
pub mod stats;
/// Trace file reading and tokenizing.
pub mod trace;

/// Single-level engine type; used for both L1 and L2.
pub use crate::cache::{Cache, Op, Outcome};
/// Root configuration type; build from CLI arguments or deserialize from JSON.
pub use crate::config::SimConfig;
/// Top-level driver; construct with [`Hierarchy::new`].
pub use crate::hierarchy::Hierarchy;
