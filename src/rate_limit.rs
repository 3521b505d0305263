use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use prometheus::Gauge;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::metrics::TRACKED_CLIENTS;

// Rate limit entry - admitted request times for one client, oldest first
#[derive(Debug, Default)]
pub struct RateLimitEntry {
    pub hits: VecDeque<Instant>,
}

impl RateLimitEntry {
    // Drop hits that fell out of the window ending at `now`
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.hits.pop_front();
        }
    }

    fn is_idle(&self, now: Instant, window: Duration) -> bool {
        self.hits
            .back()
            .is_none_or(|&newest| now.saturating_duration_since(newest) >= window)
    }
}

/// Sliding window limiter: at most `max_requests` admissions per client in any
/// trailing `window`.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
    tracked: Gauge, // mirrors entries.len()
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_gauge(max_requests, window, TRACKED_CLIENTS.clone())
    }

    pub fn with_gauge(max_requests: u32, window: Duration, tracked: Gauge) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
            tracked,
        }
    }

    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    // Admit or reject at a given moment. Rejections leave the entry's hits untouched.
    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let (admitted, inserted) = {
            let (mut entry, inserted) = match self.entries.entry(client.to_string()) {
                Entry::Occupied(occupied) => (occupied.into_ref(), false),
                Entry::Vacant(vacant) => (vacant.insert(RateLimitEntry::default()), true),
            };
            entry.prune(now, self.window);

            let admitted = entry.hits.len() < self.max_requests as usize;
            if admitted {
                entry.hits.push_back(now);
            }
            (admitted, inserted)
        };

        // the shard lock is released above, len() locks every shard
        if inserted {
            self.tracked.set(self.entries.len() as f64);
        }
        admitted
    }

    // Forget clients that have not been admitted within the window. Returns how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_idle(now, self.window));
        let after = self.entries.len();
        self.tracked.set(after as f64);
        before.saturating_sub(after)
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }
}

// Periodic sweep so clients that stop sending requests do not stay in memory forever
pub async fn sweeper(rate_limiter: Arc<RateLimiter>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(interval = ?sweep_interval, "rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = rate_limiter.sweep_at(Instant::now());
        let remaining = rate_limiter.tracked_clients();

        if removed > 0 {
            tracing::debug!(removed, remaining, "swept idle rate limit entries");
        }
    }
}
