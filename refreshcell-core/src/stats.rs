use std::sync::atomic::{AtomicU64, Ordering};

/// Access statistics for a single [`RefreshCell`](crate::RefreshCell).
///
/// Every `get` is counted either as a hit (answered from the memoized outcome,
/// including a failed one inside its retry window) or as a fetch (the fetcher
/// ran). Fetches that returned `Err` are additionally counted as failures.
///
/// # Thread Safety
///
/// Counters are updated with `Relaxed` atomics. Values read while other threads
/// are calling into the cell are a consistent lower bound, not a snapshot.
///
/// # Examples
///
/// ```
/// use refreshcell_core::CellStats;
///
/// let stats = CellStats::new();
///
/// stats.record_fetch(true);
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_fetch(false);
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.fetches(), 2);
/// assert_eq!(stats.failures(), 1);
/// assert_eq!(stats.total_accesses(), 4);
/// assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug)]
pub struct CellStats {
    hits: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
    resets: AtomicU64,
}

impl CellStats {
    /// Creates a new `CellStats` instance with zero counters.
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            resets: AtomicU64::new(0),
        }
    }

    /// Records a `get` that was answered without running the fetcher.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one fetcher invocation and whether it succeeded.
    #[inline]
    pub fn record_fetch(&self, succeeded: bool) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a call to `reset`.
    #[inline]
    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of `get` calls answered without a fetch.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of fetcher invocations.
    #[inline]
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Returns the number of fetcher invocations that returned `Err`.
    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Returns the number of `reset` calls.
    #[inline]
    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }

    /// Returns the total number of `get` calls (hits + fetches).
    #[inline]
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.fetches()
    }

    /// Fraction of `get` calls answered without a fetch, from 0.0 to 1.0.
    ///
    /// Returns 0.0 if there have been no accesses.
    ///
    /// # Examples
    ///
    /// ```
    /// use refreshcell_core::CellStats;
    ///
    /// let stats = CellStats::new();
    /// assert_eq!(stats.hit_rate(), 0.0);
    ///
    /// stats.record_fetch(true);
    /// stats.record_hit();
    /// stats.record_hit();
    /// stats.record_hit();
    /// assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    /// ```
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Fraction of fetcher invocations that failed. Returns 0.0 if nothing was
    /// fetched yet.
    #[inline]
    pub fn failure_rate(&self) -> f64 {
        let fetches = self.fetches();
        if fetches == 0 {
            0.0
        } else {
            self.failures() as f64 / fetches as f64
        }
    }

    /// Resets all counters to zero.
    ///
    /// This only touches the statistics; the cell's memoized value is unaffected.
    pub fn reset_counters(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.fetches.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.resets.store(0, Ordering::Relaxed);
    }
}

impl Default for CellStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CellStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            fetches: AtomicU64::new(self.fetches()),
            failures: AtomicU64::new(self.failures()),
            resets: AtomicU64::new(self.resets()),
        }
    }
}
