//! Request authentication middleware.
//!
//! Each protected router section carries an [`AuthState`] with the role set
//! it requires; the gate re-evaluates every request from scratch.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use pitline_auth::{AuthorizationGate, Role};
use pitline_core::OrgId;

use crate::errors;

#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<AuthorizationGate>,
    pub required: Arc<Vec<Role>>,
}

impl AuthState {
    pub fn new(gate: Arc<AuthorizationGate>, required: Vec<Role>) -> Self {
        Self {
            gate,
            required: Arc::new(required),
        }
    }
}

/// Authenticate a request; attach the resolved principal as an extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal = state
        .gate
        .authorize(authorization_header(req.headers()), &state.required, None)
        .await
        .map_err(errors::auth_error_to_response)?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Organization-scoped variant: the leading `:org_id` path segment becomes
/// the gate's scope, so the membership role (not the global role) is what
/// gets checked.
pub async fn org_auth_middleware(
    State(state): State<AuthState>,
    Path(org_id): Path<Uuid>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let scope = OrgId::from_uuid(org_id);
    let principal = state
        .gate
        .authorize(authorization_header(req.headers()), &state.required, Some(scope))
        .await
        .map_err(errors::auth_error_to_response)?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
