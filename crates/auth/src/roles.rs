//! Canonical role enumeration and hierarchy.
//!
//! There is exactly one role type and one rank table. Any external
//! representation (stored strings, request payloads) must come in through
//! [`Role::from_str`], which rejects unrecognized values instead of casting.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use pitline_core::DomainError;

/// Role within the platform, ordered from lowest to highest privilege.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Partner,
    Worker,
    Coordinator,
    Manager,
    Owner,
    Developer,
    Superadmin,
}

impl Role {
    /// All roles, in ascending rank order.
    pub const ALL: [Role; 8] = [
        Role::Viewer,
        Role::Partner,
        Role::Worker,
        Role::Coordinator,
        Role::Manager,
        Role::Owner,
        Role::Developer,
        Role::Superadmin,
    ];

    /// Privilege rank. Injective; higher means more privilege.
    ///
    /// Only the relative order matters; the absolute values are not stored
    /// anywhere and may be renumbered freely.
    pub const fn rank(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Partner => 1,
            Role::Worker => 2,
            Role::Coordinator => 3,
            Role::Manager => 4,
            Role::Owner => 5,
            Role::Developer => 6,
            Role::Superadmin => 7,
        }
    }

    /// Whether this role meets or exceeds `required` in the hierarchy.
    pub const fn has_permission(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// Whether this role may manage (grant/revoke/suspend) `target`.
    ///
    /// Strictly greater: a role can never manage an equal or higher role,
    /// including itself.
    pub const fn can_manage(self, target: Role) -> bool {
        self.rank() > target.rank()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Partner => "partner",
            Role::Worker => "worker",
            Role::Coordinator => "coordinator",
            Role::Manager => "manager",
            Role::Owner => "owner",
            Role::Developer => "developer",
            Role::Superadmin => "superadmin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "partner" => Ok(Role::Partner),
            "worker" => Ok(Role::Worker),
            "coordinator" => Ok(Role::Coordinator),
            "manager" => Ok(Role::Manager),
            "owner" => Ok(Role::Owner),
            "developer" => Ok(Role::Developer),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}
