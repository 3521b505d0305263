use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::ErrorBody;

/// Errors that end a `/dl` request. Each maps to a fixed status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("URL parameter is required")]
    MissingUrl,

    #[error("Invalid YouTube URL")]
    InvalidUrl,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// The caller only ever sees the fixed message; the cause goes to the audit log.
    #[error("Failed to fetch MP3 after 3 retries")]
    UpstreamExhausted { attempts: u32, cause: String },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl | Self::InvalidUrl => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(GatewayError::MissingUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::InvalidUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        let exhausted = GatewayError::UpstreamExhausted {
            attempts: 3,
            cause: "timeout".into(),
        };
        assert_eq!(exhausted.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn exhausted_message_hides_the_cause() {
        let err = GatewayError::UpstreamExhausted {
            attempts: 5,
            cause: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch MP3 after 3 retries");
    }
}
