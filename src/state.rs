use std::sync::Arc;

use crate::audit_log::AuditLog;
use crate::key_rotator::KeyRotator;
use crate::rate_limit::RateLimiter;
use crate::upstream::UpstreamClient;

// app's shared state

pub struct AppState {
    pub upstream: UpstreamClient,
    pub rotator: KeyRotator,
    pub rate_limiter: Arc<RateLimiter>, // shared with the sweeper task
    pub audit: AuditLog,
}
