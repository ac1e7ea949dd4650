//! # Remote Configuration Example
//!
//! A configuration service that is down for the first two attempts. The cell
//! memoizes each failure, retries only once the refresh interval has passed, and
//! keeps serving the configuration once it loads.
//!
//! Run with `RUST_LOG=refreshcell_core=trace` to see every fetch and reset.

use refreshcell::{CellState, ManualClock, RefreshCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::fmt;

static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, PartialEq)]
struct Config {
    endpoint: String,
    max_connections: u32,
}

/// Simulates a remote call that fails until the third attempt.
fn load_config() -> Result<Config, String> {
    let attempt = ATTEMPTS.fetch_add(1, Ordering::SeqCst) + 1;
    println!("  -> remote call #{}", attempt);
    if attempt < 3 {
        Err(format!("config service unavailable (attempt {})", attempt))
    } else {
        Ok(Config {
            endpoint: "https://api.example.com".to_string(),
            max_connections: 64,
        })
    }
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("refreshcell_core=debug")),
        )
        .with_target(false)
        .init();

    println!("=== Remote Configuration Example ===\n");

    let clock = ManualClock::new();
    let config: RefreshCell<Config, String> = RefreshCell::builder()
        .name("remote_config")
        .clock(clock.clone())
        .build();

    println!("t+0s: first access");
    println!("  {:?}", config.get(load_config));

    println!("t+0s: second access (failure is memoized)");
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(3));
    println!("t+3s: still inside the retry window");
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(3));
    println!("t+6s: retry");
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 2);

    clock.advance(Duration::from_secs(6));
    println!("t+12s: retry");
    let loaded = config.get(load_config);
    println!("  {:?}", loaded);
    assert!(loaded.is_ok());
    assert_eq!(config.state(), CellState::Hot);

    clock.advance(Duration::from_secs(3600));
    println!("t+1h: successful values never expire on their own");
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 3);

    println!("\nreset long after the last fetch: refetches right away");
    config.reset();
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 4);

    println!("reset again: refetch is armed, but only after the interval");
    config.reset();
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 4);

    clock.advance(Duration::from_secs(6));
    println!("t+1h+6s: interval elapsed");
    println!("  {:?}", config.get(load_config));
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 5);

    #[cfg(feature = "stats")]
    {
        let stats = config.stats();
        println!("\n=== Statistics ===");
        println!("  hits:     {}", stats.hits());
        println!("  fetches:  {}", stats.fetches());
        println!("  failures: {}", stats.failures());
        println!("  resets:   {}", stats.resets());
    }
}
