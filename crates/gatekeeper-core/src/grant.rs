//! Temporary grants.
//!
//! A temporary grant gives an identity extra flags on specific paths until
//! it expires. Grants are never removed when they expire; they simply stop
//! being active.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::record::PermissionPatch;

/// A time-bounded, per-identity permission overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryGrant {
    /// Label of the action that produced the grant. Informational only.
    #[serde(default)]
    pub action_name: String,

    /// Partial records keyed by resource path.
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionPatch>,

    /// The grant is active strictly before this instant.
    pub expires: DateTime<Utc>,
}

impl TemporaryGrant {
    /// Create a grant with no paths.
    pub fn new(action_name: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            action_name: action_name.into(),
            permissions: BTreeMap::new(),
            expires,
        }
    }

    /// Add or replace the patch for a path.
    pub fn with_path(mut self, path: impl Into<String>, patch: PermissionPatch) -> Self {
        self.permissions.insert(path.into(), patch);
        self
    }

    /// Whether the grant is active at `now`. Expiry is exclusive.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }

    /// The patch this grant carries for a path, if any.
    pub fn patch_for(&self, path: &str) -> Option<&PermissionPatch> {
        self.permissions.get(path)
    }
}

/// Parse an RFC 3339 timestamp such as `2999-01-01T00:00:00.000Z`.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
