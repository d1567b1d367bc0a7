//! Error types for the authorization core.

use gatekeeper_core::{AccountId, IdentityId, RoleId};
use gatekeeper_store::StoreError;
use thiserror::Error;

/// Errors that can occur while building or running the enhancer.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    /// A required collaborator was not provided at construction.
    #[error("missing dependency: a {0} must be provided")]
    MissingDependency(&'static str),

    /// The resolved role is empty (strict role policy only).
    #[error("failed to get the role: identity {identity_id} doesn't have a role set")]
    MissingRole { identity_id: IdentityId },

    /// No standing table exists for the pair (strict table policy only).
    #[error("failed to fetch permissions: account {account_id} doesn't have any for the role {role_id}")]
    MissingPermissions { account_id: AccountId, role_id: RoleId },

    /// Role lookup by id found no identity.
    #[error("identity not found: {0}")]
    UserNotFound(IdentityId),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthorizeError>;
