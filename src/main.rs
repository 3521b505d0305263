use anyhow::Context;
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use mp3_gateway::audit_log::AuditLog;
use mp3_gateway::config::Args;
use mp3_gateway::handlers::router;
use mp3_gateway::key_rotator::KeyRotator;
use mp3_gateway::rate_limit::{RateLimiter, sweeper};
use mp3_gateway::state::AppState;
use mp3_gateway::upstream::{RetryPolicy, UpstreamClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();

    let rotator = KeyRotator::new(&args.api_keys, args.skip_failing_after)?;
    let retry = RetryPolicy {
        max_attempts: args.max_attempts,
        backoff: args.retry_backoff(),
    };
    let upstream = UpstreamClient::new(
        reqwest::Client::new(),
        &args.upstream_url,
        args.upstream_host.clone(),
        args.upstream_timeout(),
        retry,
    )?;
    let rate_limiter = Arc::new(RateLimiter::new(args.rate_limit, args.rate_window()));

    // creating shared state
    let state = Arc::new(AppState {
        upstream,
        rotator,
        rate_limiter: Arc::clone(&rate_limiter),
        audit: AuditLog::new(&args.log_file),
    });

    // spawn the background sweeper
    tokio::spawn(sweeper(rate_limiter, args.sweep_interval()));

    let app = router(Arc::clone(&state), args.metrics);

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "gateway listening");
    tracing::info!(upstream = %state.upstream.endpoint(), keys = state.rotator.len(), "forwarding downloads");
    tracing::info!(
        rate_limit = args.rate_limit,
        window_secs = args.rate_window,
        max_attempts = args.max_attempts,
        "admission policy"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    state.audit.flush().await;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
