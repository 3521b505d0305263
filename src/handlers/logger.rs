use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::compression::gzip_response;
use crate::state::AppState;

// Serve the whole audit log
pub async fn logger_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.audit.read_all().await {
        Ok(contents) => gzip_response(StatusCode::OK, contents, "text/plain"),
        Err(e) => {
            tracing::error!(error = %e, path = %state.audit.path().display(), "failed to read audit log");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                "Error reading log file",
            )
                .into_response()
        }
    }
}
