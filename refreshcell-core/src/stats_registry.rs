use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::CellStats;

/// Global registry for cell statistics.
///
/// Cells built with a name (see
/// [`RefreshCellBuilder::name`](crate::RefreshCellBuilder::name)) register their
/// counters here, so they can be inspected without a handle to the cell itself.
/// A later registration under the same name replaces the earlier one.
///
/// # Examples
///
/// ```
/// use refreshcell_core::stats_registry;
///
/// if let Some(stats) = stats_registry::get("remote_config") {
///     println!("Fetches: {}", stats.fetches());
///     println!("Failures: {}", stats.failures());
/// }
///
/// for name in stats_registry::list() {
///     println!("Cell: {}", name);
/// }
/// ```
static STATS_REGISTRY: Lazy<RwLock<HashMap<String, Arc<CellStats>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a cell's statistics under a given name.
///
/// Called by [`RefreshCellBuilder::build`](crate::RefreshCellBuilder::build) when
/// the `stats` feature is enabled and the cell has a name.
pub fn register(name: &str, stats: Arc<CellStats>) {
    let mut registry = STATS_REGISTRY.write();
    registry.insert(name.to_string(), stats);
}

/// Get a snapshot of the statistics registered under `name`.
///
/// # Examples
///
/// ```
/// use refreshcell_core::stats_registry;
///
/// if let Some(stats) = stats_registry::get("remote_config") {
///     println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
/// } else {
///     println!("Cell not found");
/// }
/// ```
pub fn get(name: &str) -> Option<CellStats> {
    let registry = STATS_REGISTRY.read();
    registry.get(name).map(|stats| (**stats).clone())
}

/// Get a shared handle to the live statistics registered under `name`.
pub fn get_shared(name: &str) -> Option<Arc<CellStats>> {
    let registry = STATS_REGISTRY.read();
    registry.get(name).cloned()
}

/// List all registered cell names.
pub fn list() -> Vec<String> {
    let registry = STATS_REGISTRY.read();
    registry.keys().cloned().collect()
}

/// Remove the entry for `name`. Returns `false` if nothing was registered.
pub fn unregister(name: &str) -> bool {
    let mut registry = STATS_REGISTRY.write();
    registry.remove(name).is_some()
}

/// Remove the entry for `name` only if it is still `stats`.
///
/// Used when a named cell is dropped: a newer cell registered under the same name
/// keeps its entry. Returns `true` if the entry was removed.
pub fn unregister_if_same(name: &str, stats: &Arc<CellStats>) -> bool {
    let mut registry = STATS_REGISTRY.write();
    match registry.get(name) {
        Some(current) if Arc::ptr_eq(current, stats) => {
            registry.remove(name);
            true
        }
        _ => false,
    }
}

/// Clear all registered statistics.
///
/// This removes all entries from the registry but does not reset the counters
/// themselves; cells keep counting into their own `CellStats`.
///
/// # Examples
///
/// ```
/// use refreshcell_core::stats_registry;
///
/// stats_registry::clear();
/// assert!(stats_registry::list().is_empty());
/// ```
pub fn clear() {
    let mut registry = STATS_REGISTRY.write();
    registry.clear();
}

/// Reset the counters registered under `name`.
///
/// # Returns
///
/// * `true` - If the cell was found and its counters were zeroed
/// * `false` - If no cell with that name is registered
pub fn reset(name: &str) -> bool {
    let registry = STATS_REGISTRY.read();
    if let Some(stats) = registry.get(name) {
        stats.reset_counters();
        true
    } else {
        false
    }
}
