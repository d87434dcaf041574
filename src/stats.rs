//! 路由统计信息

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 路由统计计数器
#[derive(Debug, Default)]
pub struct RouterStats {
    requests: AtomicU64,
    passthrough: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    network_fetches: AtomicU64,
    network_failures: AtomicU64,
    fallbacks_served: AtomicU64,
    synthesized_errors: AtomicU64,
    cache_writes: AtomicU64,
    cache_write_failures: AtomicU64,
}

macro_rules! counter {
    ($record:ident, $field:ident) => {
        pub fn $record(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl RouterStats {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_request, requests);
    counter!(record_passthrough, passthrough);
    counter!(record_cache_hit, cache_hits);
    counter!(record_cache_miss, cache_misses);
    counter!(record_network_fetch, network_fetches);
    counter!(record_network_failure, network_failures);
    counter!(record_fallback, fallbacks_served);
    counter!(record_synthesized_error, synthesized_errors);
    counter!(record_cache_write, cache_writes);
    counter!(record_cache_write_failure, cache_write_failures);

    /// 获取快照
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            fallbacks_served: self.fallbacks_served.load(Ordering::Relaxed),
            synthesized_errors: self.synthesized_errors.load(Ordering::Relaxed),
            cache_writes: self.cache_writes.load(Ordering::Relaxed),
            cache_write_failures: self.cache_write_failures.load(Ordering::Relaxed),
        }
    }
}

/// 统计快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub passthrough: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub network_fetches: u64,
    pub network_failures: u64,
    pub fallbacks_served: u64,
    pub synthesized_errors: u64,
    pub cache_writes: u64,
    pub cache_write_failures: u64,
}

impl StatsSnapshot {
    /// 缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}
