use crate::connection::ConnectionState;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Counters {
    pub jobs_enqueued: AtomicU64,
    pub jobs_completed: AtomicU64,
    pub reconnect_attempts: AtomicU64,
    pub reconnect_successes: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountersSnapshot {
    pub jobs_enqueued: u64,
    pub jobs_completed: u64,
    pub reconnect_attempts: u64,
    pub reconnect_successes: u64,
}

impl Counters {
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            jobs_enqueued: self.jobs_enqueued.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
            reconnect_successes: self.reconnect_successes.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot returned by `query_status` (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: ConnectionState,
    pub queue_depth: i64,
    pub counters: CountersSnapshot,
}
