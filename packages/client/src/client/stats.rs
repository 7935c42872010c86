//! Client counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every request a client creates
#[derive(Debug, Default)]
pub struct ClientStats {
    pub requests_created: AtomicU64,
    pub parsers_compiled: AtomicU64,
    pub parser_cache_hits: AtomicU64,
}

/// Point-in-time copy of [`ClientStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    pub requests_created: u64,
    pub parsers_compiled: u64,
    pub parser_cache_hits: u64,
}

impl ClientStats {
    #[must_use]
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            requests_created: self.requests_created.load(Ordering::Relaxed),
            parsers_compiled: self.parsers_compiled.load(Ordering::Relaxed),
            parser_cache_hits: self.parser_cache_hits.load(Ordering::Relaxed),
        }
    }
}
