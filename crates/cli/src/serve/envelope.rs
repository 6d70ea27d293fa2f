//! The uniform response envelope.
//!
//! Every endpoint answers `{code, kind?, response}`: `kind` is the stable
//! failure kind string (absent on success), `response` the payload or the
//! human-readable failure message. Built in exactly one place so handlers
//! cannot drift apart.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use whetstone_core::ApiError;

#[derive(Debug, Serialize)]
pub(crate) struct ApiEnvelope {
    pub(crate) code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<&'static str>,
    pub(crate) response: Value,
}

impl ApiEnvelope {
    pub(crate) fn success(payload: Value) -> Self {
        ApiEnvelope {
            code: 200,
            kind: None,
            response: payload,
        }
    }

    pub(crate) fn failure(err: &ApiError) -> Self {
        ApiEnvelope {
            code: err.status(),
            kind: Some(err.kind()),
            response: Value::String(err.to_string()),
        }
    }

    /// Collapse a handler result into an envelope.
    pub(crate) fn from_result(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(payload) => ApiEnvelope::success(payload),
            Err(err) => ApiEnvelope::failure(&err),
        }
    }
}

impl IntoResponse for ApiEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
