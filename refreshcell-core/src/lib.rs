//! # Refreshcell Core
//!
//! A failure-aware memoization cell for one long-lived, expensive value.
//!
//! This crate provides [`RefreshCell`], which fetches its value on demand through
//! a caller-supplied function, shares it between any number of threads, and
//! rate-limits refetching after failures and explicit resets.
//!
//! ## Features
//!
//! - **Single fetch in flight**: the fetcher runs under the cell's write lock
//! - **Read-mostly**: cached outcomes are served under a shared `parking_lot` read lock
//! - **Sticky failures**: errors are memoized like values and retried at most once
//!   per [`REFRESH_INTERVAL`]
//! - **Advisory reset**: [`RefreshCell::reset`] arms a refetch without forcing one
//! - **Injectable time**: per-cell [`Clock`]s and a process-wide override for tests
//! - **Statistics**: hit/fetch/failure counters (with the `stats` feature)
//!
//! ## Module Organization
//!
//! - [`clock`] - Clock trait, system/manual clocks and the process-wide override
//! - `refresh_cell` - The cell, its builder and its state machine
//! - `stats` - Per-cell counters
//! - [`stats_registry`] - Process-wide lookup of named cells' counters
//!
pub mod clock;
mod refresh_cell;

#[cfg(feature = "stats")]
mod stats;

#[cfg(feature = "stats")]
pub mod stats_registry;

pub use clock::{Clock, GlobalClock, ManualClock, SystemClock};
pub use refresh_cell::{CellState, RefreshCell, RefreshCellBuilder, REFRESH_INTERVAL};

#[cfg(feature = "stats")]
pub use stats::CellStats;
