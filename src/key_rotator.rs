use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

// Single upstream API key

pub struct ApiKey {
    pub value: String,
    consecutive_failures: AtomicU32, // reset on the first success
}

impl ApiKey {
    pub fn new(value: String) -> Self {
        Self {
            value,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    // Short stable id for logs, the key itself never gets logged
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.value.as_bytes());
        format!("{:x}", digest)[..8].to_string()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("at least one API key is required")]
pub struct NoKeysError;

// Round-robin over a fixed set of API keys

pub struct KeyRotator {
    keys: Vec<ApiKey>,
    current: AtomicUsize, // always < keys.len()
    skip_failing_after: Option<u32>,
}

impl KeyRotator {
    // Create from comma-separated keys "key1, key2"
    pub fn new(keys_str: &str, skip_failing_after: Option<u32>) -> Result<Self, NoKeysError> {
        let keys: Vec<ApiKey> = keys_str
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|key| ApiKey::new(key.to_string()))
            .collect();
        if keys.is_empty() {
            return Err(NoKeysError);
        }

        tracing::info!(count = keys.len(), ?skip_failing_after, "key rotator initialized");
        for (i, key) in keys.iter().enumerate() {
            tracing::info!(index = i, key = %key.fingerprint(), "loaded api key");
        }

        Ok(Self {
            keys,
            current: AtomicUsize::new(0),
            skip_failing_after,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    // Advance the cursor and return the key it now points at. The cursor starts
    // at 0, so the first call hands out index 1 and index 0 closes the first cycle.
    pub fn next_key(&self) -> &ApiKey {
        let mut chosen = 0;
        // The pick runs inside the update so a concurrent call can never move
        // the cursor between choosing a key and committing to it.
        let _ = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cursor| {
                chosen = self.pick_after(cursor);
                Some(chosen)
            });
        &self.keys[chosen]
    }

    // Position the cursor moves to from `cursor`. Failure-aware mode takes the
    // first key from the next position that is not failing; if every key is
    // failing it falls back to plain round-robin.
    fn pick_after(&self, cursor: usize) -> usize {
        let len = self.keys.len();
        let next = (cursor + 1) % len;
        let Some(threshold) = self.skip_failing_after else {
            return next;
        };

        (1..=len)
            .map(|step| (cursor + step) % len)
            .find(|&idx| self.keys[idx].consecutive_failures() < threshold)
            .unwrap_or(next)
    }

    fn cursor(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    // Get all keys (for startup logging and tests)
    pub fn all_keys(&self) -> &[ApiKey] {
        &self.keys
    }
}
