//! Error bodies for HTTP callers
//!
//! Every non-success response the relay sends has the same shape:
//! `{ "detail": "<message>" }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Build a response carrying `status` and a `{ "detail" }` body
///
/// # Example
///
/// ```rust,ignore
/// use axum::http::StatusCode;
/// use relay_common::detail_response;
///
/// return detail_response(StatusCode::UNAUTHORIZED, "Unauthorized");
/// ```
pub fn detail_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(detail))).into_response()
}
