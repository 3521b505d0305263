use axum::{
    extract::{ConnectInfo, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::error::GatewayError;
use crate::metrics::{RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{QueryPairs, last_param};
use crate::resolver;
use crate::state::AppState;

// /dl?url=... -> admission, then url check, then the upstream call.
// The admission check runs before url validation so junk urls still use up quota.
pub async fn download_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(params): Query<QueryPairs>,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();

    let url = last_param(params, "url")
        .filter(|url| !url.is_empty())
        .ok_or(GatewayError::MissingUrl)?;

    let client = peer.ip().to_string();
    if !state.rate_limiter.check(&client) {
        RATE_LIMITED.inc();
        tracing::warn!(%client, "rate limit exceeded");
        return Err(GatewayError::RateLimited);
    }

    let video_id = resolver::video_id(&url).ok_or_else(|| {
        tracing::debug!(%client, %url, "unresolvable url");
        GatewayError::InvalidUrl
    })?;

    let start_time = Instant::now();
    let result = state.upstream.forward(&state.rotator, &video_id).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match result {
        Ok(body) => {
            state
                .audit
                .record(format!("Successfully downloaded MP3 for URL: {url}"));
            Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
        }
        Err(e) => {
            tracing::error!(%client, %video_id, attempts = e.attempts, error = %e.last, "download failed");
            state
                .audit
                .record(format!("Failed to download MP3 for URL: {url} - Error: {}", e.last));
            Err(GatewayError::UpstreamExhausted {
                attempts: e.attempts,
                cause: e.last.to_string(),
            })
        }
    }
}
