use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use flate2::{Compression, write::GzEncoder};
use std::io::{self, Write};

#[derive(Debug, thiserror::Error)]
#[error("gzip compression failed: {0}")]
pub struct CompressionError(#[from] io::Error);

pub fn gzip(body: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}

// Compress first, then build headers, so a compression failure can still
// become a plain 500 instead of a half-written gzip response.
pub fn gzip_response(status: StatusCode, body: impl AsRef<[u8]>, content_type: &str) -> Response {
    match gzip(body.as_ref()) {
        Ok(compressed) => (
            status,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_ENCODING, "gzip"),
            ],
            Body::from(compressed),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to compress response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                "Compression error",
            )
                .into_response()
        }
    }
}
