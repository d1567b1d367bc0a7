//! Store traits: the abstract interfaces the authorization core reads from.
//!
//! Backends implement all three; the core holds each behind its own
//! `Arc<dyn ...>` so they may also come from different places.

use std::sync::Arc;

use async_trait::async_trait;
use gatekeeper_core::{
    AccountId, IdentityId, PermissionDocument, PermissionTable, RoleId, StoredIdentity,
    TemporaryGrant,
};

use crate::error::Result;

/// Standing permission tables, one per (account, role).
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Find the table of an (account, role) pair.
    ///
    /// Returns `None` if the pair has no table.
    async fn find_permission_table(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> Result<Option<PermissionTable>>;

    /// Insert or replace the table of the document's (account, role) pair.
    async fn save_permission_table(&self, document: &PermissionDocument) -> Result<()>;
}

/// Temporary grants, per identity.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// All grants of an identity, expired ones included, in the order they
    /// were appended.
    ///
    /// An unknown identity has no grants.
    async fn find_grants_for_identity(&self, identity_id: &IdentityId)
        -> Result<Vec<TemporaryGrant>>;

    /// Append a grant to an existing identity.
    ///
    /// Fails with `NotFound` if the identity is unknown.
    async fn append_grant(&self, identity_id: &IdentityId, grant: &TemporaryGrant) -> Result<()>;
}

/// Stored identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find an identity by id.
    async fn find_identity(&self, identity_id: &IdentityId) -> Result<Option<StoredIdentity>>;

    /// Insert or replace an identity, including its grant list.
    async fn save_identity(&self, identity: &StoredIdentity) -> Result<()>;
}

/// A backend providing every store interface.
pub trait Store: PermissionStore + GrantStore + IdentityStore {}

impl<S: PermissionStore + GrantStore + IdentityStore + ?Sized> Store for S {}

#[async_trait]
impl<S: PermissionStore + ?Sized> PermissionStore for Arc<S> {
    async fn find_permission_table(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> Result<Option<PermissionTable>> {
        (**self).find_permission_table(account_id, role_id).await
    }

    async fn save_permission_table(&self, document: &PermissionDocument) -> Result<()> {
        (**self).save_permission_table(document).await
    }
}

#[async_trait]
impl<S: GrantStore + ?Sized> GrantStore for Arc<S> {
    async fn find_grants_for_identity(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Vec<TemporaryGrant>> {
        (**self).find_grants_for_identity(identity_id).await
    }

    async fn append_grant(&self, identity_id: &IdentityId, grant: &TemporaryGrant) -> Result<()> {
        (**self).append_grant(identity_id, grant).await
    }
}

#[async_trait]
impl<S: IdentityStore + ?Sized> IdentityStore for Arc<S> {
    async fn find_identity(&self, identity_id: &IdentityId) -> Result<Option<StoredIdentity>> {
        (**self).find_identity(identity_id).await
    }

    async fn save_identity(&self, identity: &StoredIdentity) -> Result<()> {
        (**self).save_identity(identity).await
    }
}
