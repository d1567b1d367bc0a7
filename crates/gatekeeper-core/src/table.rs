//! Permission tables.
//!
//! A table maps resource paths to standing [`PermissionRecord`]s. One table
//! exists per (account, role) pair. The stored document keeps the account
//! and role next to the path entries:
//!
//! ```json
//! {
//!   "accountId": "acc1",
//!   "roleId": "administrator",
//!   "/admin/x": { "read": true, "delete": true }
//! }
//! ```
//!
//! Keys whose value is not a record, such as `updatedAt` or `__v`, are
//! skipped when reading.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, Result};
use crate::record::PermissionRecord;
use crate::types::{AccountId, RoleId};

/// Standing permissions, keyed by resource path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable(BTreeMap<String, PermissionRecord>);

impl PermissionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record for a path, builder style.
    pub fn with(mut self, path: impl Into<String>, record: PermissionRecord) -> Self {
        self.insert(path, record);
        self
    }

    /// Add or replace the record for a path.
    pub fn insert(&mut self, path: impl Into<String>, record: PermissionRecord) {
        self.0.insert(path.into(), record);
    }

    /// The record for a path, if the table has one.
    pub fn get(&self, path: &str) -> Option<&PermissionRecord> {
        self.0.get(path)
    }

    /// Whether the table has an entry for a path.
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (path, record) pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionRecord)> {
        self.0.iter().map(|(path, record)| (path.as_str(), record))
    }
}

impl<P: Into<String>> FromIterator<(P, PermissionRecord)> for PermissionTable {
    fn from_iter<I: IntoIterator<Item = (P, PermissionRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(p, r)| (p.into(), r)).collect())
    }
}

/// A permission table as stored, with its (account, role) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDocument {
    /// Store-assigned document id, if any.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "accountId")]
    pub account_id: AccountId,

    #[serde(rename = "roleId")]
    pub role_id: RoleId,

    /// Every remaining key holding a record is a resource path.
    #[serde(flatten, deserialize_with = "records_only")]
    pub table: PermissionTable,
}

fn records_only<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<PermissionTable, D::Error> {
    let entries = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|(path, value)| {
            serde_json::from_value::<PermissionRecord>(value)
                .ok()
                .map(|record| (path, record))
        })
        .collect())
}

impl PermissionDocument {
    /// Create a document for an (account, role) pair.
    pub fn new(account_id: AccountId, role_id: RoleId, table: PermissionTable) -> Self {
        Self {
            id: None,
            account_id,
            role_id,
            table,
        }
    }

    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::DecodingError(e.to_string()))
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }
}
