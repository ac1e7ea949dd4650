//! # Refreshcell
//!
//! A thread-safe memoization cell for a single long-lived value that is expensive
//! to compute and may fail to load.
//!
//! ## Features
//!
//! - **One fetch at a time**: concurrent callers never run the fetcher in parallel
//! - **Memoized outcomes**: successes *and* failures are cached
//! - **Rate-limited retries**: after a failure or a reset, the fetcher runs again
//!   at most once per [`REFRESH_INTERVAL`] (5 seconds)
//! - **Advisory reset**: [`RefreshCell::reset`] never forces an immediate refetch
//! - **Testable time**: inject a [`ManualClock`] per cell, or override the
//!   process-wide clock with [`clock::set_override`]
//!
//! ## Quick Start
//!
//! ```rust
//! use refreshcell::RefreshCell;
//!
//! fn load_settings() -> Result<String, String> {
//!     // e.g. read a file or call a remote service
//!     Ok("theme=dark".to_string())
//! }
//!
//! let settings: RefreshCell<String, String> = RefreshCell::new();
//!
//! // First call runs the fetcher
//! let first = settings.get(load_settings);
//! // Second call is served from the cell
//! let second = settings.get(load_settings);
//! assert_eq!(first, second);
//! ```
//!
//! ## Failures
//!
//! A failed fetch is remembered. Until the refresh interval has passed, every
//! `get` returns the same error without calling the fetcher again:
//!
//! ```rust
//! use refreshcell::{ManualClock, RefreshCell};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let cell: RefreshCell<u32, String> = RefreshCell::with_clock(clock.clone());
//!
//! assert!(cell.get(|| Err("connection refused".to_string())).is_err());
//! assert!(cell.get(|| Ok(7)).is_err());
//!
//! clock.advance(Duration::from_secs(6));
//! assert_eq!(cell.get(|| Ok(7)), Ok(7));
//! ```
//!
//! ## Invalidation
//!
//! `reset` only marks the value as invalid. The next fetch still waits for the
//! refresh interval to pass since the previous one:
//!
//! ```rust
//! use refreshcell::{CellState, ManualClock, RefreshCell};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let cell: RefreshCell<&'static str, String> = RefreshCell::with_clock(clock.clone());
//!
//! cell.get(|| Ok("v1")).unwrap();
//! cell.reset();
//! assert_eq!(cell.state(), CellState::FreshStale);
//! assert_eq!(cell.get(|| Ok("v2")), Ok("v1"));
//!
//! clock.advance(Duration::from_secs(6));
//! assert_eq!(cell.get(|| Ok("v2")), Ok("v2"));
//! ```
//!
//! ## Statistics
//!
//! With the default `stats` feature, each cell counts hits, fetches and failures.
//! Named cells can be looked up through [`stats_registry`]:
//!
//! ```rust
//! use refreshcell::{stats_registry, RefreshCell};
//!
//! let cell: RefreshCell<u32, String> = RefreshCell::builder().name("answer").build();
//! cell.get(|| Ok(42)).unwrap();
//! cell.get(|| Ok(42)).unwrap();
//!
//! let stats = stats_registry::get("answer").unwrap();
//! assert_eq!(stats.fetches(), 1);
//! assert_eq!(stats.hits(), 1);
//! ```

pub use refreshcell_core::*;
