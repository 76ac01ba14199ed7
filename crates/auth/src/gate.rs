//! Request authorization gate.
//!
//! One linear check per request: bearer token → claims → principal → role.
//! Terminal on first failure, re-evaluated fresh on every request, no state
//! shared between invocations. This is the single point where internal
//! sentinels (invalid token, not found, disabled) become the error taxonomy
//! the transport layer understands.

use thiserror::Error;

use pitline_core::OrgId;

use crate::principal::Principal;
use crate::resolver::{MembershipResolver, ResolveError};
use crate::roles::Role;
use crate::token::TokenCodec;

/// Rejection produced by [`AuthorizationGate::authorize`].
///
/// The transport layer maps these to status codes; the messages are generic
/// on purpose. Internal distinctions (expired vs. tampered, not-found vs.
/// disabled) are recorded in server-side diagnostics only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("principal not found")]
    PrincipalNotFound,

    #[error("account disabled")]
    AccountDisabled,

    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Infrastructure failure while resolving the principal. Not part of
    /// the decision taxonomy; surfaces as a server error, not a denial.
    #[error("principal store unavailable")]
    Backend(#[source] anyhow::Error),
}

/// Middleware-style decision function over the token codec and resolver.
///
/// Constructed once at startup with its dependencies injected; each
/// `authorize` call performs at most one store read and holds no state
/// across calls.
#[derive(Clone)]
pub struct AuthorizationGate {
    codec: TokenCodec,
    resolver: MembershipResolver,
}

impl AuthorizationGate {
    pub fn new(codec: TokenCodec, resolver: MembershipResolver) -> Self {
        Self { codec, resolver }
    }

    /// Admit or reject a request.
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    /// `required` is the set of admissible roles (**exact membership**, not
    /// hierarchy comparison); empty means "any authenticated principal".
    /// When `scope` names an organization the principal belongs to, the
    /// membership role is checked instead of the global role.
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        required: &[Role],
        scope: Option<OrgId>,
    ) -> Result<Principal, AuthError> {
        // 1. Bearer token present and well-formed. No store I/O before this.
        let token = extract_bearer(authorization).ok_or(AuthError::MissingToken)?;

        // 2. Signature + expiry. All decode failures are one outcome.
        let claims = self.codec.decode(token).ok_or(AuthError::InvalidToken)?;

        // 3. Fresh principal per request.
        let principal = match self.resolver.resolve(claims.sub).await {
            Ok(principal) => principal,
            Err(ResolveError::NotFound) => {
                tracing::debug!(subject = %claims.sub, "rejected: token subject no longer exists");
                return Err(AuthError::PrincipalNotFound);
            }
            Err(ResolveError::Store(e)) => {
                tracing::error!(error = %e, "principal store failure during authorization");
                return Err(AuthError::Backend(e));
            }
        };

        // 4. Disabled accounts are a distinct rejection from unknown ones.
        if !principal.is_active {
            tracing::debug!(subject = %principal.id, "rejected: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        // 5. Role check: exact set membership of the applicable role.
        if !required.is_empty() {
            let role = principal.applicable_role(scope);
            if !required.contains(&role) {
                tracing::debug!(
                    subject = %principal.id,
                    role = %role,
                    "rejected: role not in required set"
                );
                return Err(AuthError::InsufficientPermissions);
            }
        }

        Ok(principal)
    }
}

/// Extract the token from a `Bearer <token>` header value.
fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
