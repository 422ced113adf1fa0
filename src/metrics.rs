use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Client-side counters, shared by the gateway, the push listener and the refetch path.
#[derive(Clone)]
pub struct Metrics {
    pub requests_sent: Arc<AtomicU64>,
    pub requests_failed: Arc<AtomicU64>,
    pub toasts_published: Arc<AtomicU64>,
    pub push_messages: Arc<AtomicU64>,
    pub push_ignored: Arc<AtomicU64>,
    pub push_reconnects: Arc<AtomicU64>,
    pub refetches: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_sent: Arc::new(AtomicU64::new(0)),
            requests_failed: Arc::new(AtomicU64::new(0)),
            toasts_published: Arc::new(AtomicU64::new(0)),
            push_messages: Arc::new(AtomicU64::new(0)),
            push_ignored: Arc::new(AtomicU64::new(0)),
            push_reconnects: Arc::new(AtomicU64::new(0)),
            refetches: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_requests_sent(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_requests_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_toasts(&self) {
        self.toasts_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_push_messages(&self) {
        self.push_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_push_ignored(&self) {
        self.push_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_push_reconnects(&self) {
        self.push_reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refetches(&self) {
        self.refetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            toasts_published: self.toasts_published.load(Ordering::Relaxed),
            push_messages: self.push_messages.load(Ordering::Relaxed),
            push_ignored: self.push_ignored.load(Ordering::Relaxed),
            push_reconnects: self.push_reconnects.load(Ordering::Relaxed),
            refetches: self.refetches.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub requests_sent: u64,
    pub requests_failed: u64,
    pub toasts_published: u64,
    pub push_messages: u64,
    pub push_ignored: u64,
    pub push_reconnects: u64,
    pub refetches: u64,
    pub uptime_seconds: u64,
}
