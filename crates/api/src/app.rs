//! Router construction and handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use pitline_auth::{
    AuthorizationGate, IdentityService, MembershipResolver, Principal, Registration, Role,
    TokenCodec,
};
use pitline_core::OrgId;
use pitline_infra::{AuthConfig, InMemoryPrincipalStore};

use crate::errors;
use crate::middleware::{AuthState, auth_middleware, org_auth_middleware};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// Handlers
// -------------------------

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn register(
    Extension(identity): Extension<IdentityService>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    // Self-registration always starts at the bottom of the hierarchy;
    // elevated roles are granted by an existing manager, not claimed.
    let registration = Registration {
        email: body.email,
        name: body.name,
        password: body.password,
        global_role: Role::Viewer,
    };

    match identity.register(registration).await {
        Ok(issued) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "user_id": issued.user_id.to_string(),
                "token": issued.token,
            })),
        )
            .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn login(
    Extension(identity): Extension<IdentityService>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    match identity.login(&body.email, &body.password).await {
        Ok(issued) => Json(serde_json::json!({
            "user_id": issued.user_id.to_string(),
            "token": issued.token,
        }))
        .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn whoami(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": principal.id.to_string(),
        "email": principal.email,
        "name": principal.name,
        "global_role": principal.global_role.as_str(),
        "memberships": principal
            .memberships
            .iter()
            .map(|m| serde_json::json!({
                "org_id": m.org_id.to_string(),
                "role": m.role.as_str(),
            }))
            .collect::<Vec<_>>(),
    }))
}

pub async fn admin_ping() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "pong" }))
}

/// Stage board for one organization. Placeholder payload; the point here is
/// the org-scoped role check in front of it.
pub async fn org_board(
    Extension(principal): Extension<Principal>,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let org = OrgId::from_uuid(org_id);
    Json(serde_json::json!({
        "org_id": org.to_string(),
        "role": principal.applicable_role(Some(org)).as_str(),
        "stages": [],
    }))
}

// -------------------------
// App wiring
// -------------------------

/// Build the router over a fresh in-memory store.
pub fn build_app(config: &AuthConfig) -> Router {
    build_app_with_store(config, Arc::new(InMemoryPrincipalStore::new()))
}

/// Build the router over an injected store (tests seed through it).
pub fn build_app_with_store(config: &AuthConfig, store: Arc<InMemoryPrincipalStore>) -> Router {
    let provider = config.secret_provider();
    let codec = TokenCodec::new(&provider, config.token_ttl);

    let resolver = MembershipResolver::new(store.clone());
    let gate = Arc::new(AuthorizationGate::new(codec.clone(), resolver));
    let identity = IdentityService::new(store, codec);

    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .layer(Extension(identity));

    // Any authenticated principal.
    let protected = Router::new()
        .route("/whoami", get(whoami))
        .layer(axum::middleware::from_fn_with_state(
            AuthState::new(gate.clone(), vec![]),
            auth_middleware,
        ));

    // Exact role set, global role applies.
    let admin = Router::new()
        .route("/admin/ping", get(admin_ping))
        .layer(axum::middleware::from_fn_with_state(
            AuthState::new(
                gate.clone(),
                vec![Role::Manager, Role::Owner, Role::Developer, Role::Superadmin],
            ),
            auth_middleware,
        ));

    // Exact role set, membership role within :org_id applies.
    let org_scoped = Router::new()
        .route("/orgs/:org_id/board", get(org_board))
        .layer(axum::middleware::from_fn_with_state(
            AuthState::new(gate, vec![Role::Coordinator, Role::Manager, Role::Owner]),
            org_auth_middleware,
        ));

    public.merge(protected).merge(admin).merge(org_scoped)
}
