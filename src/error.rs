use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failures while fetching or interpreting a directions response. All of
/// these are recoverable: the UI keeps its empty route list and the user
/// retries.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("directions request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("directions API returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("directions API error: {status}: {message}")]
    Upstream { status: String, message: String },

    #[error("no routes found")]
    NoRoutes,

    #[error("failed to parse directions response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl IntoResponse for RoutingError {
    fn into_response(self) -> Response {
        let status = match &self {
            RoutingError::NoRoutes => StatusCode::NOT_FOUND,
            RoutingError::Request(_)
            | RoutingError::UpstreamStatus(_)
            | RoutingError::Upstream { .. }
            | RoutingError::Parse(_) => StatusCode::BAD_GATEWAY,
        };
        log::error!("route request failed: {self}");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
