//! Per-cell statistics and the named-cell registry

#[cfg(feature = "stats")]
mod tests {
    use refreshcell::{stats_registry, ManualClock, RefreshCell};
    use serial_test::serial;
    use std::time::Duration;

    #[test]
    #[serial]
    fn test_named_cell_is_registered() {
        let clock = ManualClock::new();
        let cell: RefreshCell<String, String> = RefreshCell::builder()
            .name("stats_named_cell")
            .clock(clock.clone())
            .build();

        assert!(stats_registry::list().contains(&"stats_named_cell".to_string()));

        let _ = cell.get(|| Err("down".to_string()));
        let _ = cell.get(|| Err("down".to_string()));
        clock.advance(Duration::from_secs(6));
        let _ = cell.get(|| Ok("up".to_string()));

        let stats = stats_registry::get("stats_named_cell").unwrap();
        assert_eq!(stats.fetches(), 2);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.hits(), 1);
        assert!((stats.failure_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    #[serial]
    fn test_registry_reset_zeroes_live_counters() {
        let cell: RefreshCell<u32, String> = RefreshCell::builder()
            .name("stats_reset_cell")
            .clock(ManualClock::new())
            .build();

        let _ = cell.get(|| Ok(1));
        let _ = cell.get(|| Ok(1));
        assert_eq!(cell.stats().total_accesses(), 2);

        assert!(stats_registry::reset("stats_reset_cell"));
        assert_eq!(cell.stats().total_accesses(), 0);

        // Counting continues; the cached value is untouched
        assert_eq!(cell.get(|| Ok(2)), Ok(1));
        assert_eq!(cell.stats().hits(), 1);
    }

    #[test]
    #[serial]
    fn test_unnamed_cells_are_not_registered() {
        stats_registry::clear();
        let cell: RefreshCell<u32, String> = RefreshCell::with_clock(ManualClock::new());
        let _ = cell.get(|| Ok(1));

        assert!(stats_registry::list().is_empty());
        assert_eq!(cell.stats().fetches(), 1);
    }

    #[test]
    #[serial]
    fn test_resets_are_counted() {
        let cell: RefreshCell<u32, String> = RefreshCell::builder()
            .name("stats_resets_cell")
            .clock(ManualClock::new())
            .build();

        cell.reset();
        cell.reset();

        let stats = stats_registry::get("stats_resets_cell").unwrap();
        assert_eq!(stats.resets(), 2);
        assert_eq!(stats.total_accesses(), 0);
    }

    #[test]
    #[serial]
    fn test_dropped_named_cell_is_unregistered() {
        {
            let cell = RefreshCell::builder()
                .name("stats_scoped_cell")
                .clock(ManualClock::new())
                .build();
            let value: Result<u32, String> = cell.get(|| Ok(5));
            assert_eq!(value, Ok(5));
            assert!(stats_registry::get("stats_scoped_cell").is_some());
        }

        assert!(stats_registry::get("stats_scoped_cell").is_none());
        assert!(!stats_registry::list().contains(&"stats_scoped_cell".to_string()));
    }
}
