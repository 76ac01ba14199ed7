//! Principal and membership types.
//!
//! [`PrincipalRecord`] is what the store collaborator hands back (one row per
//! subject, memberships with status). [`Principal`] is the resolved,
//! per-request view: active memberships only, built fresh for every request
//! and discarded with it.

use serde::{Deserialize, Serialize};

use pitline_core::{OrgId, UserId};

use crate::credential::PasswordRecord;
use crate::roles::Role;
use crate::token::TokenSubject;

/// Status of a principal's membership in an organization.
///
/// Only `Active` memberships participate in authorization decisions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Pending,
    Inactive,
}

/// A membership row as stored: organization, role, status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRecord {
    pub org_id: OrgId,
    pub role: Role,
    pub status: MembershipStatus,
}

/// A principal as stored by the collaborator.
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub global_role: Role,
    pub memberships: Vec<MembershipRecord>,
    pub password: PasswordRecord,
}

/// An active membership on a resolved principal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub org_id: OrgId,
    pub role: Role,
}

/// The authenticated identity attached to a request.
///
/// # Invariants
/// - `memberships` contains only `Active` rows (the resolver filters).
/// - Never cached across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub global_role: Role,
    pub memberships: Vec<Membership>,
}

impl Principal {
    /// The role this principal holds within `org`, if a member.
    pub fn role_in(&self, org: OrgId) -> Option<Role> {
        self.memberships
            .iter()
            .find(|m| m.org_id == org)
            .map(|m| m.role)
    }

    /// The role that applies to a decision: the membership role when the
    /// request is scoped to an organization the principal belongs to, the
    /// global role otherwise.
    pub fn applicable_role(&self, scope: Option<OrgId>) -> Role {
        scope
            .and_then(|org| self.role_in(org))
            .unwrap_or(self.global_role)
    }

    /// Summary used for token issuance.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id,
            global_role: self.global_role,
            org_ids: self.memberships.iter().map(|m| m.org_id).collect(),
        }
    }
}
