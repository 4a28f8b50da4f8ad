//! Fixed-window attempt counters for the login throttle.
//!
//! Flow Overview:
//! 1) `register_attempt` performs fetch-or-create, window rollover and
//!    increment as one atomic unit per key.
//! 2) `clear` removes a key's record when a login is observed to succeed.
//! 3) `sweep` evicts records whose window expired, run from a periodic task.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Mutable per-key state. `window_start_ms` is fixed for the lifetime of a
/// window; it only moves on a full reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AttemptRecord {
    count: u32,
    window_start_ms: i64,
}

/// Snapshot returned to the throttle after an attempt is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptSnapshot {
    pub count: u32,
    pub window_start_ms: i64,
}

/// Keyed counter storage behind the login throttle.
///
/// Abstract so a single-process map and a networked shared cache are
/// interchangeable; multi-instance deployments need the latter.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Count one attempt for `key` and return the post-increment state.
    ///
    /// The read-modify-write (fetch-or-create, conditional window reset,
    /// increment, persist) must not interleave with another call for the
    /// same key.
    async fn register_attempt(&self, key: &str, now_ms: i64) -> AttemptSnapshot;

    /// Drop a key's record entirely (early reset on observed success).
    async fn clear(&self, key: &str);

    /// Remove records whose window has expired; returns how many were evicted.
    async fn sweep(&self, now_ms: i64) -> usize;

    /// Number of live records.
    async fn len(&self) -> usize;
}

/// Process-local store guarded by one async mutex.
///
/// A single global lock serializes all keys; login-attempt volume is low
/// enough that this is not a bottleneck.
pub struct InMemoryCounterStore {
    window_ms: i64,
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl InMemoryCounterStore {
    #[must_use]
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            records: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn register_attempt(&self, key: &str, now_ms: i64) -> AttemptSnapshot {
        let mut records = self.records.lock().await;
        let record = records.entry(key.to_string()).or_insert(AttemptRecord {
            count: 0,
            window_start_ms: now_ms,
        });
        if now_ms - record.window_start_ms > self.window_ms {
            // Window rollover: wholesale reset, then count the new attempt.
            record.count = 0;
            record.window_start_ms = now_ms;
        }
        record.count = record.count.saturating_add(1);
        AttemptSnapshot {
            count: record.count,
            window_start_ms: record.window_start_ms,
        }
    }

    async fn clear(&self, key: &str) {
        let mut records = self.records.lock().await;
        records.remove(key);
    }

    async fn sweep(&self, now_ms: i64) -> usize {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| now_ms - record.window_start_ms <= self.window_ms);
        before - records.len()
    }

    async fn len(&self) -> usize {
        let records = self.records.lock().await;
        records.len()
    }
}

/// Background task evicting expired records so abandoned keys do not grow the
/// store without bound.
pub fn spawn_sweep_task(store: Arc<dyn CounterStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = store.sweep(super::super::now_unix_millis()).await;
            if removed > 0 {
                debug!(removed, "swept expired throttle records");
            }
        }
    });
}
