use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A source of monotonic timestamps used for every refresh-interval comparison.
///
/// Production cells read [`GlobalClock`], which defers to the system clock unless
/// a process-wide override is installed with [`set_override`]. Cells built with
/// [`RefreshCell::with_clock`](crate::RefreshCell::with_clock) read their own clock
/// instead.
///
/// # Examples
///
/// ```
/// use refreshcell_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let t0 = clock.now();
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(clock.now() - t0, Duration::from_secs(10));
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current reading of this clock.
    fn now(&self) -> Instant;
}

/// The real monotonic clock, backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Reads the process-wide clock: the installed override if any, otherwise the
/// system clock. This is the clock of every cell created with `RefreshCell::new()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalClock;

impl Clock for GlobalClock {
    #[inline]
    fn now(&self) -> Instant {
        now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can hand one clone to a cell and keep
/// another to drive time forward.
#[derive(Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Creates a clock pinned at the current system time.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock pinned at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }

    /// Pins the clock at `at`. Moving backwards is allowed.
    pub fn set(&self, at: Instant) {
        *self.current.lock() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("current", &*self.current.lock())
            .finish()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}

/// Adapter turning any `Fn() -> Instant` into a [`Clock`]. See [`from_fn`].
#[derive(Clone)]
pub struct FnClock<F> {
    f: F,
}

impl<F> Clock for FnClock<F>
where
    F: Fn() -> Instant + Send + Sync,
{
    #[inline]
    fn now(&self) -> Instant {
        (self.f)()
    }
}

impl<F> fmt::Debug for FnClock<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnClock").finish_non_exhaustive()
    }
}

/// Builds a clock from a closure.
///
/// # Examples
///
/// ```
/// use refreshcell_core::clock::{self, Clock};
/// use std::time::Instant;
///
/// let pinned = Instant::now();
/// let clock = clock::from_fn(move || pinned);
/// assert_eq!(clock.now(), pinned);
/// ```
pub fn from_fn<F>(f: F) -> FnClock<F>
where
    F: Fn() -> Instant + Send + Sync,
{
    FnClock { f }
}

static OVERRIDE: Lazy<RwLock<Option<Arc<dyn Clock>>>> = Lazy::new(|| RwLock::new(None));

/// Returns the current process-wide time.
///
/// Uses the clock installed by [`set_override`] if there is one, otherwise
/// [`Instant::now`].
pub fn now() -> Instant {
    match OVERRIDE.read().as_ref() {
        Some(clock) => clock.now(),
        None => Instant::now(),
    }
}

/// Replaces the process-wide clock until the returned guard is dropped.
///
/// Intended for tests. Rebinding while other threads are reading cells backed by
/// [`GlobalClock`] is memory-safe but makes their interval arithmetic meaningless,
/// so tests that use this should run serially.
///
/// # Examples
///
/// ```
/// use refreshcell_core::clock;
/// use refreshcell_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let manual = ManualClock::new();
/// let pinned = {
///     let _guard = clock::set_override(manual.clone());
///     manual.advance(Duration::from_secs(3));
///     clock::now()
/// };
/// assert_eq!(pinned, manual.now());
/// ```
#[must_use = "the override is removed as soon as the guard is dropped"]
pub fn set_override<C>(clock: C) -> ClockOverride
where
    C: Clock + 'static,
{
    let previous = OVERRIDE.write().replace(Arc::new(clock));
    ClockOverride { previous }
}

/// Guard returned by [`set_override`]. Restores the previously installed clock
/// (or the system clock) on drop.
pub struct ClockOverride {
    previous: Option<Arc<dyn Clock>>,
}

impl fmt::Debug for ClockOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockOverride")
            .field("restores_previous", &self.previous.is_some())
            .finish()
    }
}

impl Drop for ClockOverride {
    fn drop(&mut self) {
        *OVERRIDE.write() = self.previous.take();
    }
}
