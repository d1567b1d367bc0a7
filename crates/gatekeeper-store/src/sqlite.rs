//! SQLite implementation of the store traits.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! `tokio::task::spawn_blocking`. Documents are stored as JSON text.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::SecondsFormat;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use gatekeeper_core::{
    parse_timestamp, AccountId, IdentityId, PermissionDocument, PermissionPatch, PermissionTable,
    RoleId, StoredIdentity, TemporaryGrant,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{GrantStore, IdentityStore, PermissionStore};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(format!("connection mutex: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

/// The `identities.roles` column: an object keyed by role name, primary first.
#[derive(Serialize, Deserialize)]
struct RolesColumn(#[serde(with = "gatekeeper_core::role_map")] Vec<RoleId>);

fn format_expires(grant: &TemporaryGrant) -> String {
    grant.expires.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn insert_grant(conn: &Connection, identity_id: &str, grant: &TemporaryGrant) -> Result<()> {
    let permissions = serde_json::to_string(&grant.permissions)?;
    conn.execute(
        "INSERT INTO temporary_grants (identity_id, action_name, permissions, expires)
         VALUES (?1, ?2, ?3, ?4)",
        params![identity_id, grant.action_name, permissions, format_expires(grant)],
    )?;
    Ok(())
}

fn load_grants(conn: &Connection, identity_id: &str) -> Result<Vec<TemporaryGrant>> {
    let mut stmt = conn.prepare(
        "SELECT action_name, permissions, expires
         FROM temporary_grants WHERE identity_id = ?1
         ORDER BY grant_seq",
    )?;

    let rows = stmt
        .query_map(params![identity_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(action_name, permissions, expires)| {
            let permissions: BTreeMap<String, PermissionPatch> = serde_json::from_str(&permissions)?;
            let expires =
                parse_timestamp(&expires).map_err(|e| StoreError::InvalidData(e.to_string()))?;
            Ok(TemporaryGrant {
                action_name,
                permissions,
                expires,
            })
        })
        .collect()
}

fn identity_exists(conn: &Connection, identity_id: &str) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM identities WHERE identity_id = ?1)",
        params![identity_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

#[async_trait]
impl PermissionStore for SqliteStore {
    async fn find_permission_table(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> Result<Option<PermissionTable>> {
        let account_id = account_id.clone();
        let role_id = role_id.clone();

        self.with_conn(move |conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT document FROM permission_tables
                     WHERE account_id = ?1 AND role_id = ?2",
                    params![account_id.as_str(), role_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            json.map(|json| {
                PermissionDocument::from_json(&json)
                    .map(|doc| doc.table)
                    .map_err(|e| StoreError::InvalidData(e.to_string()))
            })
            .transpose()
        })
        .await
    }

    async fn save_permission_table(&self, document: &PermissionDocument) -> Result<()> {
        let json = document
            .to_json()
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let account_id = document.account_id.clone();
        let role_id = document.role_id.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO permission_tables (account_id, role_id, document, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (account_id, role_id)
                 DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at",
                params![account_id.as_str(), role_id.as_str(), json, now_millis()],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl GrantStore for SqliteStore {
    async fn find_grants_for_identity(
        &self,
        identity_id: &IdentityId,
    ) -> Result<Vec<TemporaryGrant>> {
        let identity_id = identity_id.clone();
        self.with_conn(move |conn| load_grants(conn, identity_id.as_str()))
            .await
    }

    async fn append_grant(&self, identity_id: &IdentityId, grant: &TemporaryGrant) -> Result<()> {
        let identity_id = identity_id.clone();
        let grant = grant.clone();

        self.with_conn(move |conn| {
            if !identity_exists(conn, identity_id.as_str())? {
                return Err(StoreError::NotFound(format!("identity {}", identity_id)));
            }
            insert_grant(conn, identity_id.as_str(), &grant)
        })
        .await
    }
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn find_identity(&self, identity_id: &IdentityId) -> Result<Option<StoredIdentity>> {
        let identity_id = identity_id.clone();

        self.with_conn(move |conn| {
            let roles: Option<String> = conn
                .query_row(
                    "SELECT roles FROM identities WHERE identity_id = ?1",
                    params![identity_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(roles) = roles else {
                return Ok(None);
            };

            let RolesColumn(roles) = serde_json::from_str(&roles)?;
            let temporary_permissions = load_grants(conn, identity_id.as_str())?;
            Ok(Some(StoredIdentity {
                id: identity_id,
                roles,
                temporary_permissions,
            }))
        })
        .await
    }

    async fn save_identity(&self, identity: &StoredIdentity) -> Result<()> {
        let identity = identity.clone();
        let roles = serde_json::to_string(&RolesColumn(identity.roles.clone()))?;

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let id = identity.id.as_str();

            tx.execute(
                "INSERT INTO identities (identity_id, roles, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (identity_id)
                 DO UPDATE SET roles = excluded.roles, updated_at = excluded.updated_at",
                params![id, roles, now_millis()],
            )?;

            // The grant list is replaced wholesale, like the document it mirrors.
            tx.execute(
                "DELETE FROM temporary_grants WHERE identity_id = ?1",
                params![id],
            )?;
            for grant in &identity.temporary_permissions {
                insert_grant(&tx, id, grant)?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use gatekeeper_core::{Action, PermissionRecord};

    fn document(account: &str, role: &str) -> PermissionDocument {
        PermissionDocument::new(
            AccountId::new(account),
            RoleId::new(role),
            PermissionTable::new()
                .with("/admin/test/role", PermissionRecord::new(true, false, true, false))
                .with("/admin/other/role", PermissionRecord::new(true, false, false, true)),
        )
    }

    fn grant(name: &str) -> TemporaryGrant {
        TemporaryGrant::new(name, parse_timestamp("2999-01-01T00:00:00.000Z").unwrap())
            .with_path("/admin/test/role", PermissionPatch::new().with(Action::Create, true))
    }

    #[tokio::test]
    async fn test_save_and_find_permission_table() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_permission_table(&document("acc1", "administrator")).await.unwrap();

        let table = store
            .find_permission_table(&AccountId::new("acc1"), &RoleId::new("administrator"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(table, document("acc1", "administrator").table);

        let missing = store
            .find_permission_table(&AccountId::new("acc1"), &RoleId::new("agent"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_save_permission_table_replaces() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_permission_table(&document("acc1", "administrator")).await.unwrap();

        let replacement = PermissionDocument::new(
            AccountId::new("acc1"),
            RoleId::new("administrator"),
            PermissionTable::new().with("/only", PermissionRecord::ALLOW_ALL),
        );
        store.save_permission_table(&replacement).await.unwrap();

        let table = store
            .find_permission_table(&AccountId::new("acc1"), &RoleId::new("administrator"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains("/only"));
    }

    #[tokio::test]
    async fn test_identity_with_grants_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let stored = StoredIdentity::new("u1")
            .with_role("administrator")
            .with_grant(grant("first"))
            .with_grant(grant("second"));
        store.save_identity(&stored).await.unwrap();

        let found = store.find_identity(&IdentityId::new("u1")).await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.primary_role().map(RoleId::as_str), Some("administrator"));
    }

    #[tokio::test]
    async fn test_grants_keep_append_order() {
        let store = SqliteStore::open_memory().unwrap();
        let id = IdentityId::new("u1");
        store.save_identity(&StoredIdentity::new("u1")).await.unwrap();

        for name in ["a", "b", "c"] {
            store.append_grant(&id, &grant(name)).await.unwrap();
        }

        let names: Vec<_> = store
            .find_grants_for_identity(&id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.action_name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_save_identity_replaces_grants() {
        let store = SqliteStore::open_memory().unwrap();
        let id = IdentityId::new("u1");
        store
            .save_identity(&StoredIdentity::new("u1").with_grant(grant("old")))
            .await
            .unwrap();
        store
            .save_identity(&StoredIdentity::new("u1").with_grant(grant("new")))
            .await
            .unwrap();

        let grants = store.find_grants_for_identity(&id).await.unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].action_name, "new");
    }

    #[tokio::test]
    async fn test_expired_grants_are_kept() {
        let store = SqliteStore::open_memory().unwrap();
        let id = IdentityId::new("u1");
        store.save_identity(&StoredIdentity::new("u1")).await.unwrap();

        let expired = TemporaryGrant::new("expired", Utc::now() - Duration::days(3));
        store.append_grant(&id, &expired).await.unwrap();

        assert_eq!(store.find_grants_for_identity(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_grant_unknown_identity() {
        let store = SqliteStore::open_memory().unwrap();
        let err = store
            .append_grant(&IdentityId::new("ghost"), &grant("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_roles_column_keyed_by_role() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .save_identity(&StoredIdentity::new("u1").with_role("agent").with_role("administrator"))
            .await
            .unwrap();

        let column: String = store
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT roles FROM identities WHERE identity_id = 'u1'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(column, r#"{"agent":1,"administrator":1}"#);

        let found = store.find_identity(&IdentityId::new("u1")).await.unwrap().unwrap();
        assert_eq!(found.primary_role().map(RoleId::as_str), Some("agent"));
    }

    #[tokio::test]
    async fn test_roles_column_accepts_array_rows() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO identities (identity_id, roles, updated_at)
                     VALUES ('u1', '[\"administrator\"]', 0)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let found = store.find_identity(&IdentityId::new("u1")).await.unwrap().unwrap();
        assert_eq!(found.primary_role().map(RoleId::as_str), Some("administrator"));
    }

    #[tokio::test]
    async fn test_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatekeeper.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_permission_table(&document("acc1", "administrator")).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let table = store
            .find_permission_table(&AccountId::new("acc1"), &RoleId::new("administrator"))
            .await
            .unwrap();
        assert!(table.is_some());
    }
}
