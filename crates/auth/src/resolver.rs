//! Membership resolution against the store collaborator.
//!
//! Status filtering happens here, at a single query boundary: downstream
//! authorization logic never sees pending/inactive memberships.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pitline_core::UserId;

use crate::principal::{Membership, MembershipStatus, Principal, PrincipalRecord};

/// Store collaborator consumed by the resolver.
///
/// Implementations live elsewhere (relational store, in-memory for tests).
/// The error channel is for infrastructure failure only; "no such subject"
/// is `Ok(None)`.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_principal(&self, subject: UserId) -> anyhow::Result<Option<PrincipalRecord>>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The subject does not exist.
    ///
    /// Distinct from a disabled account: a disabled account resolves
    /// successfully with `is_active = false`, and the gate rejects it with a
    /// different error.
    #[error("principal not found")]
    NotFound,

    #[error("principal store failure")]
    Store(#[source] anyhow::Error),
}

/// Resolves a subject id to a [`Principal`] with active memberships only.
#[derive(Clone)]
pub struct MembershipResolver {
    store: Arc<dyn PrincipalStore>,
}

impl MembershipResolver {
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, subject: UserId) -> Result<Principal, ResolveError> {
        let record = self
            .store
            .find_principal(subject)
            .await
            .map_err(ResolveError::Store)?
            .ok_or(ResolveError::NotFound)?;

        Ok(Self::into_principal(record))
    }

    fn into_principal(record: PrincipalRecord) -> Principal {
        let memberships = record
            .memberships
            .into_iter()
            .filter(|m| m.status == MembershipStatus::Active)
            .map(|m| Membership {
                org_id: m.org_id,
                role: m.role,
            })
            .collect();

        Principal {
            id: record.id,
            email: record.email,
            name: record.name,
            is_active: record.is_active,
            global_role: record.global_role,
            memberships,
        }
    }
}
