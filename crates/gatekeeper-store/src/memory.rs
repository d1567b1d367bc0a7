//! In-memory implementation of the store traits.
//!
//! Same semantics as SQLite, no persistence. Grants live on their identity,
//! as in the document store the SQLite schema mirrors.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use gatekeeper_core::{
    AccountId, IdentityId, PermissionDocument, PermissionTable, RoleId, StoredIdentity,
    TemporaryGrant,
};

use crate::error::{Result, StoreError};
use crate::traits::{GrantStore, IdentityStore, PermissionStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Permission documents indexed by (account, role).
    tables: HashMap<(AccountId, RoleId), PermissionDocument>,

    /// Identities indexed by id; grants are kept in append order.
    identities: HashMap<IdentityId, StoredIdentity>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn find_permission_table(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> Result<Option<PermissionTable>> {
        let inner = self.read()?;
        Ok(inner
            .tables
            .get(&(account_id.clone(), role_id.clone()))
            .map(|doc| doc.table.clone()))
    }

    async fn save_permission_table(&self, document: &PermissionDocument) -> Result<()> {
        let mut inner = self.write()?;
        inner.tables.insert(
            (document.account_id.clone(), document.role_id.clone()),
            document.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn find_grants_for_identity(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Vec<TemporaryGrant>> {
        let inner = self.read()?;
        Ok(inner
            .identities
            .get(identity_id)
            .map(|identity| identity.temporary_permissions.clone())
            .unwrap_or_default())
    }

    async fn append_grant(&self, identity_id: &IdentityId, grant: &TemporaryGrant) -> Result<()> {
        let mut inner = self.write()?;
        let identity = inner
            .identities
            .get_mut(identity_id)
            .ok_or_else(|| StoreError::NotFound(format!("identity {}", identity_id)))?;
        identity.temporary_permissions.push(grant.clone());
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_identity(&self, identity_id: &IdentityId) -> Result<Option<StoredIdentity>> {
        let inner = self.read()?;
        Ok(inner.identities.get(identity_id).cloned())
    }

    async fn save_identity(&self, identity: &StoredIdentity) -> Result<()> {
        let mut inner = self.write()?;
        inner.identities.insert(identity.id.clone(), identity.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use gatekeeper_core::{Action, PermissionPatch, PermissionRecord};

    fn document() -> PermissionDocument {
        PermissionDocument::new(
            AccountId::new("acc1"),
            RoleId::new("administrator"),
            PermissionTable::new().with("/admin/x", PermissionRecord::new(true, false, false, true)),
        )
    }

    #[tokio::test]
    async fn test_memory_store_permission_table() {
        let store = MemoryStore::new();
        store.save_permission_table(&document()).await.unwrap();

        let table = store
            .find_permission_table(&AccountId::new("acc1"), &RoleId::new("administrator"))
            .await
            .unwrap()
            .unwrap();
        assert!(table.get("/admin/x").unwrap().delete);

        let other_account = store
            .find_permission_table(&AccountId::new("acc2"), &RoleId::new("administrator"))
            .await
            .unwrap();
        assert!(other_account.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_grants_keep_append_order() {
        let store = MemoryStore::new();
        let id = IdentityId::new("u1");
        store.save_identity(&StoredIdentity::new("u1")).await.unwrap();

        let expires = Utc::now() + Duration::hours(1);
        for name in ["first", "second", "third"] {
            let grant = TemporaryGrant::new(name, expires)
                .with_path("/p", PermissionPatch::new().with(Action::Read, true));
            store.append_grant(&id, &grant).await.unwrap();
        }

        let names: Vec<_> = store
            .find_grants_for_identity(&id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.action_name)
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_memory_store_unknown_identity() {
        let store = MemoryStore::new();
        let id = IdentityId::new("ghost");

        assert!(store.find_grants_for_identity(&id).await.unwrap().is_empty());
        assert!(store.find_identity(&id).await.unwrap().is_none());

        let grant = TemporaryGrant::new("a", Utc::now());
        let err = store.append_grant(&id, &grant).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
