use parking_lot::RwLock;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, GlobalClock};
#[cfg(feature = "stats")]
use crate::CellStats;

/// Minimum time between two fetcher invocations on the same cell, once the cell
/// is not holding a successful value.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// The refresh state of a [`RefreshCell`].
///
/// | State        | cached | fetched before |
/// |--------------|--------|----------------|
/// | `FreshEmpty` | no     | no             |
/// | `FreshStale` | no     | yes            |
/// | `Hot`        | yes    | yes            |
///
/// A cell starts `FreshEmpty`. A successful fetch moves it to `Hot`, a failed one
/// to `FreshStale`, and [`RefreshCell::reset`] moves `Hot` to `FreshStale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Never fetched.
    FreshEmpty,
    /// Fetched before, but the last fetch failed or the value was reset.
    FreshStale,
    /// Holding a successful value.
    Hot,
}

/// Outcome of the most recent fetch, stamped with the clock reading taken right
/// after the fetcher returned.
struct Fetched<T, E> {
    at: Instant,
    outcome: Result<T, E>,
}

/// Everything the cell's lock guards.
///
/// Invariant: `cached` implies `last` holds an `Ok` outcome.
struct Slot<T, E> {
    cached: bool,
    last: Option<Fetched<T, E>>,
}

impl<T, E> Slot<T, E> {
    const fn empty() -> Self {
        Self {
            cached: false,
            last: None,
        }
    }

    /// True when the cell holds no valid value and the last attempt is strictly
    /// more than [`REFRESH_INTERVAL`] in the past.
    fn needs_fetch(&self, now: Instant) -> bool {
        if self.cached {
            return false;
        }
        match &self.last {
            None => true,
            // A deadline past the end of `Instant` is never reached.
            Some(last) => last
                .at
                .checked_add(REFRESH_INTERVAL)
                .is_some_and(|deadline| deadline < now),
        }
    }

    /// The memoized outcome, if it may be served at `now` without fetching.
    fn settled(&self, now: Instant) -> Option<&Result<T, E>> {
        if self.needs_fetch(now) {
            None
        } else {
            self.last.as_ref().map(|last| &last.outcome)
        }
    }

    fn record(&mut self, outcome: Result<T, E>, now: Instant) {
        // Keep the timestamp monotonic even if the clock steps backwards.
        let at = match &self.last {
            Some(previous) if previous.at > now => previous.at,
            _ => now,
        };
        self.cached = outcome.is_ok();
        self.last = Some(Fetched { at, outcome });
    }

    fn state(&self) -> CellState {
        match (self.cached, &self.last) {
            (true, _) => CellState::Hot,
            (false, None) => CellState::FreshEmpty,
            (false, Some(_)) => CellState::FreshStale,
        }
    }
}

/// A lazily fetched, failure-aware memoization cell for one long-lived value.
///
/// Callers pass the fetch function on every [`get`](Self::get). The cell runs it
/// when it holds no valid value, memoizes the outcome (success *or* error), and
/// keeps at least [`REFRESH_INTERVAL`] between fetches after a failure or a
/// [`reset`](Self::reset), so neither can turn into a tight retry loop.
///
/// # Thread Safety
///
/// All state sits behind one `parking_lot::RwLock`:
/// - **Read lock** for the fast path: any number of threads can be served the
///   memoized outcome at once.
/// - **Write lock** for fetching and for `reset`. The fetcher runs while the write
///   lock is held, so at most one fetch is in flight and a slow fetcher blocks
///   every other caller until it returns.
///
/// After releasing the read lock and taking the write lock, `get` re-checks
/// whether a fetch is still needed: threads that queued behind a fetching peer get
/// that peer's result instead of fetching again.
///
/// A fetcher must not call back into the same cell; the write lock is not
/// re-entrant and that deadlocks. A fetcher that panics leaves the cell exactly as
/// it was before the attempt (`parking_lot` locks do not poison).
///
/// # Examples
///
/// ```
/// use refreshcell_core::{ManualClock, RefreshCell};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let cell: RefreshCell<String, String> = RefreshCell::with_clock(clock.clone());
///
/// // First access fetches.
/// assert_eq!(cell.get(|| Ok("v1".to_string())), Ok("v1".to_string()));
///
/// // Later accesses are served from the cell.
/// assert_eq!(cell.get(|| Ok("v2".to_string())), Ok("v1".to_string()));
///
/// // A reset is advisory: nothing changes until the interval has passed.
/// cell.reset();
/// assert_eq!(cell.get(|| Ok("v2".to_string())), Ok("v1".to_string()));
///
/// clock.advance(Duration::from_secs(6));
/// assert_eq!(cell.get(|| Ok("v2".to_string())), Ok("v2".to_string()));
/// ```
pub struct RefreshCell<T, E> {
    slot: RwLock<Slot<T, E>>,
    clock: Arc<dyn Clock>,
    name: Option<String>,
    #[cfg(feature = "stats")]
    stats: Arc<CellStats>,
}

impl<T, E> RefreshCell<T, E> {
    /// Creates an empty cell that reads the process-wide clock.
    pub fn new() -> Self {
        Self::from_parts(None, Arc::new(GlobalClock))
    }

    /// Creates an empty cell that reads `clock` instead of the process-wide clock.
    pub fn with_clock<C>(clock: C) -> Self
    where
        C: Clock + 'static,
    {
        Self::from_parts(None, Arc::new(clock))
    }

    /// Starts building a named and/or custom-clocked cell.
    pub fn builder() -> RefreshCellBuilder<T, E> {
        RefreshCellBuilder::default()
    }

    fn from_parts(name: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(Slot::empty()),
            clock,
            name,
            #[cfg(feature = "stats")]
            stats: Arc::new(CellStats::new()),
        }
    }

    /// Marks the memoized value as invalid.
    ///
    /// The outcome and timestamp of the last fetch are kept: `get` keeps returning
    /// the old value until [`REFRESH_INTERVAL`] has passed since that fetch, and
    /// only then fetches again. Repeated resets therefore never cause more than one
    /// fetch per interval.
    pub fn reset(&self) {
        let mut slot = self.slot.write();
        slot.cached = false;
        drop(slot);

        #[cfg(feature = "stats")]
        self.stats.record_reset();
        tracing::trace!(cell = self.label(), "reset");
    }

    /// Current refresh state.
    pub fn state(&self) -> CellState {
        self.slot.read().state()
    }

    /// Whether the cell holds a successful value that has not been reset.
    pub fn is_cached(&self) -> bool {
        self.slot.read().cached
    }

    /// Clock reading recorded after the most recent fetch, if any.
    pub fn last_fetched_at(&self) -> Option<Instant> {
        self.slot.read().last.as_ref().map(|last| last.at)
    }

    /// Name given through the builder, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Hit, fetch, failure and reset counters of this cell.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CellStats {
        &self.stats
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

impl<T: Clone, E: Clone> RefreshCell<T, E> {
    /// Returns the memoized outcome, running `fetch` first if one is due.
    ///
    /// `fetch` is invoked when the cell has never fetched, or when it holds no
    /// valid value (the last fetch failed, or [`reset`](Self::reset) was called)
    /// and the clock reads strictly later than the last fetch plus
    /// [`REFRESH_INTERVAL`]. Otherwise the previous outcome is returned as is,
    /// including a previous `Err`.
    ///
    /// Errors are the fetcher's own, returned unchanged; the cell adds none.
    ///
    /// # Examples
    ///
    /// ```
    /// use refreshcell_core::{ManualClock, RefreshCell};
    /// use std::time::Duration;
    ///
    /// let clock = ManualClock::new();
    /// let cell: RefreshCell<u32, String> = RefreshCell::with_clock(clock.clone());
    ///
    /// // A failure is memoized...
    /// assert_eq!(cell.get(|| Err("down".to_string())), Err("down".to_string()));
    /// assert_eq!(cell.get(|| Ok(1)), Err("down".to_string()));
    ///
    /// // ...until the interval has passed.
    /// clock.advance(Duration::from_secs(10));
    /// assert_eq!(cell.get(|| Ok(1)), Ok(1));
    /// ```
    pub fn get<F>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // Read lock - concurrent readers are served in parallel
        {
            let slot = self.slot.read();
            if let Some(outcome) = slot.settled(self.clock.now()) {
                #[cfg(feature = "stats")]
                self.stats.record_hit();
                return outcome.clone();
            }
        } // Read lock released here

        let mut slot = self.slot.write();

        // Another thread may have fetched while we waited for the write lock.
        if let Some(outcome) = slot.settled(self.clock.now()) {
            tracing::trace!(cell = self.label(), "fetched by another caller");
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return outcome.clone();
        }

        tracing::debug!(cell = self.label(), state = ?slot.state(), "fetching");
        let outcome = fetch();
        let now = self.clock.now();

        let succeeded = outcome.is_ok();
        tracing::debug!(
            cell = self.label(),
            outcome = if succeeded { "ok" } else { "err" },
            "fetch completed"
        );
        #[cfg(feature = "stats")]
        self.stats.record_fetch(succeeded);

        slot.record(outcome.clone(), now);
        outcome
    }
}

impl<T, E> Default for RefreshCell<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Named cells take their entry out of the stats registry when dropped, unless a
/// newer cell has since registered under the same name.
#[cfg(feature = "stats")]
impl<T, E> Drop for RefreshCell<T, E> {
    fn drop(&mut self) {
        if let Some(name) = self.name.as_deref() {
            crate::stats_registry::unregister_if_same(name, &self.stats);
        }
    }
}

impl<T, E> fmt::Debug for RefreshCell<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read();
        f.debug_struct("RefreshCell")
            .field("name", &self.name)
            .field("state", &slot.state())
            .field("last_fetched_at", &slot.last.as_ref().map(|last| last.at))
            .finish_non_exhaustive()
    }
}

/// Builder for a [`RefreshCell`] with a name and/or a custom clock.
///
/// # Examples
///
/// ```
/// use refreshcell_core::{ManualClock, RefreshCell};
///
/// let cell: RefreshCell<u64, String> = RefreshCell::builder()
///     .name("exchange_rates")
///     .clock(ManualClock::new())
///     .build();
///
/// assert_eq!(cell.name(), Some("exchange_rates"));
/// ```
pub struct RefreshCellBuilder<T, E> {
    name: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    _cell: PhantomData<fn() -> (T, E)>,
}

impl<T, E> Default for RefreshCellBuilder<T, E> {
    fn default() -> Self {
        Self {
            name: None,
            clock: None,
            _cell: PhantomData,
        }
    }
}

impl<T, E> RefreshCellBuilder<T, E> {
    /// Names the cell. The name labels tracing events and, with the `stats`
    /// feature, registers the cell's counters in
    /// [`stats_registry`](crate::stats_registry) for as long as the cell lives.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Uses `clock` instead of the process-wide clock.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Creates the empty cell, registering its statistics if it has a name.
    pub fn build(self) -> RefreshCell<T, E> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(GlobalClock));
        let cell = RefreshCell::from_parts(self.name, clock);

        #[cfg(feature = "stats")]
        {
            if let Some(name) = cell.name.as_deref() {
                crate::stats_registry::register(name, Arc::clone(&cell.stats));
            }
        }

        cell
    }
}
