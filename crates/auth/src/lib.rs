//! `pitline-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: the store is
//! a collaborator trait, and nothing here encodes transport semantics.

pub mod credential;
pub mod gate;
pub mod identity;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod token;

pub use credential::{CredentialError, PasswordRecord, hash_password, verify_password};
pub use gate::{AuthError, AuthorizationGate};
pub use identity::{CredentialStore, IdentityError, IdentityService, IssuedToken, Registration};
pub use principal::{Membership, MembershipRecord, MembershipStatus, Principal, PrincipalRecord};
pub use resolver::{MembershipResolver, PrincipalStore, ResolveError};
pub use roles::Role;
pub use token::{Claims, SecretProvider, TokenCodec, TokenError, TokenSubject};
