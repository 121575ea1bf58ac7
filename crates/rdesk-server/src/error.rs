//! HTTP-facing error type and status mapping.
//!
//! Component errors ([`GateError`], [`InputError`]) are converted into an
//! [`ApiError`] at the handler boundary.  The response body keeps the
//! `success: false` shape the clients expect, with a machine-readable code
//! and a human-readable message.  Device and capture failures are presented
//! as "temporarily unavailable" — backend detail goes to the log, not to the
//! client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::application::gate::GateError;
use crate::application::input_pipeline::InputError;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or out-of-range request; never reached a backend.
    Validation(String),
    /// Bad credentials or no remote-access entitlement.
    Authentication(String),
    /// Missing, malformed, expired, or revoked bearer token.
    InvalidToken,
    /// Valid session, insufficient access level.
    Forbidden(String),
    /// A backend call failed; the operation may succeed later.
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "invalid_request",
            ApiError::Authentication(_) => "authentication_failed",
            ApiError::InvalidToken => "invalid_token",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Unavailable(_) => "temporarily_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Authentication(msg) => msg.clone(),
            ApiError::InvalidToken => "invalid or expired token".to_string(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::Unavailable(msg) => msg.clone(),
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                "internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.message()
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::BadCredentials => {
                ApiError::Authentication("invalid credentials".to_string())
            }
            GateError::NoEntitlement => ApiError::Authentication(
                "user does not have remote access permissions".to_string(),
            ),
            // The four token failure modes stay distinguishable in the log
            // but collapse to one response, so a caller cannot probe which
            // stage rejected the token.
            GateError::TokenMalformed
            | GateError::TokenSignature
            | GateError::TokenExpired
            | GateError::TokenRevoked => {
                tracing::debug!("token rejected: {err}");
                ApiError::InvalidToken
            }
        }
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::PermissionDenied => {
                ApiError::Forbidden("full control access required".to_string())
            }
            InputError::OutOfBounds { .. } | InputError::InvalidKeycode(_) => {
                ApiError::Validation(err.to_string())
            }
            InputError::Device(device_err) => {
                tracing::warn!("device backend failure: {device_err}");
                ApiError::Unavailable("input device temporarily unavailable".to_string())
            }
        }
    }
}
