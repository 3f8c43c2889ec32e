//! Cache metrics.

use metrics::describe_counter;

/// Metric names.
pub mod names {
    /// Lookups answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "tessera_cache_hits_total";
    /// Lookups that fell through to the store.
    pub const CACHE_MISSES_TOTAL: &str = "tessera_cache_misses_total";
    /// Cache operations that failed and were swallowed.
    pub const CACHE_ERRORS_TOTAL: &str = "tessera_cache_errors_total";
}

/// Register cache metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Cache lookups served from the cache");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Cache lookups that fell back to the store");
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Cache operations that failed and were ignored"
    );
}
