//! Mapping gate/identity rejections to HTTP responses.
//!
//! Response bodies stay generic: the distinct rejection reasons live in
//! server-side logs only. Status codes follow the contract: missing/invalid
//! token and unknown principal are 401, disabled account and insufficient
//! role are 403.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pitline_auth::{AuthError, IdentityError};

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::MissingToken | AuthError::InvalidToken | AuthError::PrincipalNotFound => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required")
        }
        AuthError::AccountDisabled | AuthError::InsufficientPermissions => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "access denied")
        }
        AuthError::Backend(e) => {
            tracing::error!(error = ?e, "authorization backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    match err {
        IdentityError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid credentials")
        }
        IdentityError::EmailTaken => {
            json_error(StatusCode::CONFLICT, "conflict", "registration conflict")
        }
        IdentityError::Credential(e) => {
            tracing::error!(error = %e, "credential hashing failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        IdentityError::Token(e) => {
            tracing::error!(error = %e, "token issuance failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        IdentityError::Store(e) => {
            tracing::error!(error = ?e, "credential store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
