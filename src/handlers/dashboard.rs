use axum::{http::StatusCode, response::Response};

use crate::compression::gzip_response;

static DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

pub async fn dashboard_handler() -> Response {
    gzip_response(StatusCode::OK, DASHBOARD_HTML, "text/html")
}
