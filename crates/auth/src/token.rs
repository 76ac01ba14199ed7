//! Signed, expiring identity tokens (HS256).
//!
//! The codec is constructed once from an injected [`SecretProvider`] and
//! passed to whoever needs it. The signing secret is never read from
//! process state at call sites, never stored elsewhere, and never logged.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pitline_core::{OrgId, UserId};

use crate::roles::Role;

/// Default token lifetime: 24 hours.
pub fn default_ttl() -> Duration {
    Duration::hours(24)
}

/// Supplies the symmetric signing secret.
///
/// Sourced from process configuration by the caller; consulted exactly once,
/// when the codec is constructed.
pub trait SecretProvider: Send + Sync {
    fn signing_secret(&self) -> &str;
}

/// Claim set carried by an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal) identifier.
    pub sub: UserId,

    /// Global role at issuance time.
    #[serde(rename = "role")]
    pub global_role: Role,

    /// Organizations the subject belonged to at issuance time.
    #[serde(rename = "orgs", default)]
    pub org_ids: Vec<OrgId>,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

/// The identity summary a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: UserId,
    pub global_role: Role,
    pub org_ids: Vec<OrgId>,
}

/// Failure to *produce* a token.
///
/// Signature-library failures at issuance indicate misconfiguration and
/// propagate as real errors. Decode failures never do; see
/// [`TokenCodec::decode`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Issues and validates signed identity tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &dyn SecretProvider, ttl: Duration) -> Self {
        let secret = secret.signing_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a hard boundary; no grace window.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &dyn SecretProvider) -> Self {
        Self::new(secret, default_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for `subject`, expiring after the codec's TTL.
    pub fn issue(&self, subject: TokenSubject) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.id,
            global_role: subject.global_role,
            org_ids: subject.org_ids,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Decode and validate a token.
    ///
    /// Signature mismatch, structural corruption and expiry all collapse to
    /// `None`: callers must treat any decode failure as "unauthenticated"
    /// and must not be able to distinguish the reasons. The distinct reason
    /// is kept in server-side diagnostics only.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("token rejected: expired"),
                    ErrorKind::InvalidSignature => {
                        tracing::debug!("token rejected: signature mismatch")
                    }
                    _ => tracing::debug!(error = %e, "token rejected: malformed"),
                }
                None
            }
        }
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Keys are secret material; expose only the TTL.
        f.debug_struct("TokenCodec").field("ttl", &self.ttl).finish()
    }
}
