// Many threads read one cell while another thread keeps resetting it.
// Reads share the RwLock; fetches stay rate-limited regardless of resets.

use refreshcell::{stats_registry, RefreshCell};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

static GENERATION: AtomicU64 = AtomicU64::new(0);

fn fetch_token() -> Result<u64, String> {
    // Simulate a slow token endpoint
    thread::sleep(Duration::from_millis(100));
    Ok(GENERATION.fetch_add(1, Ordering::SeqCst))
}

fn main() {
    println!("=== Concurrent Readers Demo ===\n");

    let token: Arc<RefreshCell<u64, String>> =
        Arc::new(RefreshCell::builder().name("auth_token").build());
    let stop = Arc::new(AtomicBool::new(false));

    let resetter = {
        let token = Arc::clone(&token);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                token.reset();
                thread::sleep(Duration::from_millis(10));
            }
        })
    };

    let start = Instant::now();
    let readers: Vec<_> = (1..=20)
        .map(|reader_id| {
            let token = Arc::clone(&token);
            thread::spawn(move || {
                let mut reads = 0;
                for _ in 0..10_000 {
                    let value = token.get(fetch_token);
                    assert!(value.is_ok());
                    reads += 1;
                }
                println!("  Reader {:2}: {} reads", reader_id, reads);
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    resetter.join().unwrap();

    println!("\n  Total time: {:?}", start.elapsed());

    if let Some(stats) = stats_registry::get("auth_token") {
        println!("\n=== Statistics ===");
        println!("  hits:     {}", stats.hits());
        println!("  fetches:  {}", stats.fetches());
        println!("  resets:   {}", stats.resets());
        println!("  hit rate: {:.4}", stats.hit_rate());
    }
}
