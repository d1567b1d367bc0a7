//! Test fixtures and helpers.
//!
//! Store setup plus two store wrappers for integration tests: one that
//! counts calls and one that always fails.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use gatekeeper_core::{
    AccountId, IdentityId, PermissionDocument, PermissionPatch, PermissionTable, RoleId,
    StoredIdentity, TemporaryGrant,
};
use gatekeeper_store::{
    GrantStore, IdentityStore, MemoryStore, PermissionStore, Result as StoreResult, StoreError,
};

/// An in-memory store and a fixed "now".
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub now: DateTime<Utc>,
}

impl TestFixture {
    /// Create a fixture evaluated at the current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a fixture evaluated at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            now,
        }
    }

    /// Store the table of an (account, role) pair.
    pub async fn seed_table(
        &self,
        account_id: &str,
        role_id: &str,
        table: PermissionTable,
    ) -> StoreResult<()> {
        self.store
            .save_permission_table(&PermissionDocument::new(
                AccountId::new(account_id),
                RoleId::new(role_id),
                table,
            ))
            .await
    }

    /// Store an identity with its grants.
    pub async fn seed_identity(&self, identity: StoredIdentity) -> StoreResult<()> {
        self.store.save_identity(&identity).await
    }

    /// A single-path grant expiring `ttl` after the fixture's now. A negative
    /// `ttl` gives an already expired grant.
    pub fn grant(&self, name: &str, path: &str, patch: PermissionPatch, ttl: Duration) -> TemporaryGrant {
        TemporaryGrant::new(name, self.now + ttl).with_path(path, patch)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Store calls observed by a [`CountingStore`].
#[derive(Debug, Default)]
pub struct CallCounts {
    pub find_permission_table: AtomicUsize,
    pub find_grants_for_identity: AtomicUsize,
    pub find_identity: AtomicUsize,
}

impl CallCounts {
    pub fn tables(&self) -> usize {
        self.find_permission_table.load(Ordering::SeqCst)
    }

    pub fn grants(&self) -> usize {
        self.find_grants_for_identity.load(Ordering::SeqCst)
    }

    pub fn identities(&self) -> usize {
        self.find_identity.load(Ordering::SeqCst)
    }

    /// Total reads across all three stores.
    pub fn reads(&self) -> usize {
        self.tables() + self.grants() + self.identities()
    }
}

/// Wraps a store and counts every read.
pub struct CountingStore<S> {
    inner: S,
    counts: Arc<CallCounts>,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: Arc::new(CallCounts::default()),
        }
    }

    /// Shared handle to the counters.
    pub fn counts(&self) -> Arc<CallCounts> {
        self.counts.clone()
    }
}

#[async_trait]
impl<S: PermissionStore> PermissionStore for CountingStore<S> {
    async fn find_permission_table(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> StoreResult<Option<PermissionTable>> {
        self.counts.find_permission_table.fetch_add(1, Ordering::SeqCst);
        self.inner.find_permission_table(account_id, role_id).await
    }

    async fn save_permission_table(&self, document: &PermissionDocument) -> StoreResult<()> {
        self.inner.save_permission_table(document).await
    }
}

#[async_trait]
impl<S: GrantStore> GrantStore for CountingStore<S> {
    async fn find_grants_for_identity(
        &self,
        identity_id: &IdentityId,
    ) -> StoreResult<Vec<TemporaryGrant>> {
        self.counts.find_grants_for_identity.fetch_add(1, Ordering::SeqCst);
        self.inner.find_grants_for_identity(identity_id).await
    }

    async fn append_grant(&self, identity_id: &IdentityId, grant: &TemporaryGrant) -> StoreResult<()> {
        self.inner.append_grant(identity_id, grant).await
    }
}

#[async_trait]
impl<S: IdentityStore> IdentityStore for CountingStore<S> {
    async fn find_identity(&self, identity_id: &IdentityId) -> StoreResult<Option<StoredIdentity>> {
        self.counts.find_identity.fetch_add(1, Ordering::SeqCst);
        self.inner.find_identity(identity_id).await
    }

    async fn save_identity(&self, identity: &StoredIdentity) -> StoreResult<()> {
        self.inner.save_identity(identity).await
    }
}

/// A store whose every call fails with [`StoreError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    reason: String,
}

impl FailingStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> StoreResult<T> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl PermissionStore for FailingStore {
    async fn find_permission_table(
        &self,
        _account_id: &AccountId,
        _role_id: &RoleId,
    ) -> StoreResult<Option<PermissionTable>> {
        self.fail()
    }

    async fn save_permission_table(&self, _document: &PermissionDocument) -> StoreResult<()> {
        self.fail()
    }
}

#[async_trait]
impl GrantStore for FailingStore {
    async fn find_grants_for_identity(
        &self,
        _identity_id: &IdentityId,
    ) -> StoreResult<Vec<TemporaryGrant>> {
        self.fail()
    }

    async fn append_grant(&self, _identity_id: &IdentityId, _grant: &TemporaryGrant) -> StoreResult<()> {
        self.fail()
    }
}

#[async_trait]
impl IdentityStore for FailingStore {
    async fn find_identity(&self, _identity_id: &IdentityId) -> StoreResult<Option<StoredIdentity>> {
        self.fail()
    }

    async fn save_identity(&self, _identity: &StoredIdentity) -> StoreResult<()> {
        self.fail()
    }
}
