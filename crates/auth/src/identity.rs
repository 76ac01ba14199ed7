//! Registration and login: credentials in, tokens out.
//!
//! Login failure collapses to a single `InvalidCredentials` outcome toward
//! the client: unknown email, wrong password and disabled account are
//! indistinguishable there, to keep account enumeration and validation
//! oracles closed. The distinct reason goes to tracing only.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pitline_core::UserId;

use crate::credential::{CredentialError, hash_password, verify_password};
use crate::principal::{MembershipStatus, PrincipalRecord};
use crate::roles::Role;
use crate::token::{TokenCodec, TokenError, TokenSubject};

/// Store collaborator for the identity flows.
///
/// Email lookup for login, insertion for registration. Infrastructure
/// failures only on the error channel; "no such email" is `Ok(None)`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<PrincipalRecord>>;

    /// Insert a new principal. Returns `false` when the email is taken.
    async fn insert_principal(&self, record: PrincipalRecord) -> anyhow::Result<bool>;
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Unknown email, wrong password, or disabled account. Deliberately
    /// one variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("credential store failure")]
    Store(#[source] anyhow::Error),
}

/// A freshly issued session token and the subject it names.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user_id: UserId,
    pub token: String,
}

/// Registration input. The password arrives raw and is consumed here:
/// hashed immediately, never stored or logged.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
    pub global_role: Role,
}

/// Issues tokens for verified credentials.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
}

impl IdentityService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Register a new principal and issue its first token.
    pub async fn register(&self, registration: Registration) -> Result<IssuedToken, IdentityError> {
        let password = hash_password(&registration.password)?;
        let record = PrincipalRecord {
            id: UserId::new(),
            email: registration.email,
            name: registration.name,
            is_active: true,
            global_role: registration.global_role,
            memberships: vec![],
            password,
        };

        let user_id = record.id;
        let subject = TokenSubject {
            id: user_id,
            global_role: record.global_role,
            org_ids: vec![],
        };

        let inserted = self
            .store
            .insert_principal(record)
            .await
            .map_err(IdentityError::Store)?;
        if !inserted {
            return Err(IdentityError::EmailTaken);
        }

        tracing::info!(subject = %user_id, "principal registered");
        let token = self.codec.issue(subject)?;
        Ok(IssuedToken { user_id, token })
    }

    /// Verify credentials and issue a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, IdentityError> {
        let record = match self
            .store
            .find_by_email(email)
            .await
            .map_err(IdentityError::Store)?
        {
            Some(record) => record,
            None => {
                tracing::debug!("login rejected: unknown email");
                return Err(IdentityError::InvalidCredentials);
            }
        };

        if !verify_password(password, record.password.as_str()) {
            tracing::debug!(subject = %record.id, "login rejected: password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        if !record.is_active {
            tracing::debug!(subject = %record.id, "login rejected: account disabled");
            return Err(IdentityError::InvalidCredentials);
        }

        let subject = TokenSubject {
            id: record.id,
            global_role: record.global_role,
            org_ids: record
                .memberships
                .iter()
                .filter(|m| m.status == MembershipStatus::Active)
                .map(|m| m.org_id)
                .collect(),
        };

        tracing::info!(subject = %record.id, "login succeeded");
        let token = self.codec.issue(subject)?;
        Ok(IssuedToken {
            user_id: record.id,
            token,
        })
    }
}
