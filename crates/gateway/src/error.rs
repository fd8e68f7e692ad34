//! API error responses
//!
//! Client input errors answer with a 4xx status and a plain description.
//! The opt-in bounded wait answers 504 with an in-band style `{error}`
//! body. Target-reported failures never pass through here; they are
//! delivered as 200 responses by the handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing {0} parameter")]
    MissingParam(&'static str),

    #[error("Invalid {0} parameter")]
    InvalidParam(&'static str),

    #[error("{0}")]
    InvalidPayload(String),

    #[error("No response from target within {0} seconds")]
    ReplyTimeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::ReplyTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({"error": self.to_string()})),
            )
                .into_response(),
            Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
            Self::MissingParam(_) | Self::InvalidParam(_) | Self::InvalidPayload(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_parameter() {
        assert_eq!(ApiError::MissingParam("enc").to_string(), "Missing enc parameter");
        assert_eq!(
            ApiError::InvalidParam("business").to_string(),
            "Invalid business parameter"
        );
    }
}
