mod dashboard;
mod download;
mod logger;
mod metrics;

pub use dashboard::dashboard_handler;
pub use download::download_handler;
pub use logger::logger_handler;
pub use metrics::metrics_handler;

use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{any, get},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

// Routes match on path only, any method is accepted
pub fn router(state: Arc<AppState>, expose_metrics: bool) -> Router {
    let mut router = Router::new()
        .route("/", any(dashboard_handler))
        .route("/dl", any(download_handler))
        .route("/logger", any(logger_handler));

    if expose_metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
}
