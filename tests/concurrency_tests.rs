//! Randomized concurrent access: many threads fetching, failing and resetting

use parking_lot::Mutex;
use refreshcell::{clock, RefreshCell, REFRESH_INTERVAL};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const RUNS: usize = 10;
const THREADS: usize = 100;

/// Shared bookkeeping for one run.
#[derive(Default)]
struct Observed {
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
    fetches: AtomicUsize,
    produced: Mutex<HashSet<Result<u64, String>>>,
}

impl Observed {
    fn fetch(&self, id: u64, fail: bool) -> Result<u64, String> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(fastrand::u64(0..5)));

        let outcome = if fail {
            Err(format!("init failed {}", id))
        } else {
            Ok(id)
        };
        self.produced.lock().insert(outcome.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

#[test]
fn test_concurrent_storm() {
    for _ in 0..RUNS {
        let base = Instant::now();
        let elapsed_secs = Arc::new(AtomicU64::new(0));

        // Every reading moves time forward by 0..10 seconds.
        let ticker = Arc::clone(&elapsed_secs);
        let cell: Arc<RefreshCell<u64, String>> =
            Arc::new(RefreshCell::with_clock(clock::from_fn(move || {
                let delta = ticker.fetch_add(fastrand::u64(0..10), Ordering::SeqCst);
                base + Duration::from_secs(delta)
            })));
        let observed = Arc::new(Observed::default());
        let returned = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..THREADS as u64)
            .map(|id| {
                let cell = Arc::clone(&cell);
                let observed = Arc::clone(&observed);
                let returned = Arc::clone(&returned);
                thread::spawn(move || match fastrand::u8(0..3) {
                    0 => {
                        let outcome = cell.get(|| observed.fetch(id, false));
                        returned.lock().push(outcome);
                    }
                    1 => {
                        let outcome = cell.get(|| observed.fetch(id, true));
                        returned.lock().push(outcome);
                    }
                    _ => cell.reset(),
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(
            !observed.overlapped.load(Ordering::SeqCst),
            "two fetches ran at the same time"
        );

        // Consecutive fetches are more than one interval apart on this clock.
        let total = elapsed_secs.load(Ordering::SeqCst);
        let fetches = observed.fetches.load(Ordering::SeqCst) as u64;
        assert!(
            fetches <= total / REFRESH_INTERVAL.as_secs() + 1,
            "{} fetches over {} seconds",
            fetches,
            total
        );

        // Every outcome handed out was produced by some fetch.
        let produced = observed.produced.lock();
        for outcome in returned.lock().iter() {
            assert!(produced.contains(outcome), "unknown outcome {:?}", outcome);
        }
    }
}

#[test]
fn test_slow_fetch_serves_waiters_the_same_value() {
    let cell: Arc<RefreshCell<u64, String>> = Arc::new(RefreshCell::with_clock(
        refreshcell::ManualClock::new(),
    ));
    let fetches = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..32u64)
        .map(|id| {
            let cell = Arc::clone(&cell);
            let fetches = Arc::clone(&fetches);
            thread::spawn(move || {
                cell.get(|| {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(30));
                    Ok(id)
                })
            })
        })
        .collect();

    let results: HashSet<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(results.len(), 1);
}
