//! Error responses
//!
//! Page routes answer with an HTML error page, API routes with `{"error": ...}`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use podcast_common::Error;
use serde_json::json;
use tracing::error;

use crate::views;

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidPlaybackIndex { .. } | Error::InvalidQueue(_) | Error::EmptyQueue => {
            StatusCode::BAD_REQUEST
        }
        Error::SourceFetch(_) | Error::MalformedRecord { .. } => StatusCode::BAD_GATEWAY,
        Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Failure while generating an HTML page
#[derive(Debug)]
pub struct PageError(pub Error);

impl From<Error> for PageError {
    fn from(error: Error) -> Self {
        PageError(error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = match &self.0 {
            Error::NotFound(what) => views::not_found(what),
            other => {
                error!("Page generation failed: {}", other);
                views::unavailable(&other.to_string())
            }
        };
        (status, Html(body)).into_response()
    }
}

/// JSON API errors
#[derive(Debug)]
pub enum ApiError {
    InvalidSession(String),
    Core(Error),
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::Core(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidSession(id) => {
                (StatusCode::BAD_REQUEST, format!("Invalid session id: {}", id))
            }
            ApiError::Core(e) => {
                let status = status_for(&e);
                if status.is_server_error() {
                    error!("API request failed: {}", e);
                }
                (status, e.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
