//! Effective permission for a single path.
//!
//! Pure and synchronous: the only side effect is the log line emitted when
//! the table or the path is missing.

use chrono::{DateTime, Utc};

use gatekeeper_core::{PermissionPatch, PermissionRecord, PermissionTable, TemporaryGrant};

use crate::overlay::active_grants;

/// Fold the patches active grants carry for `path`, in grant order.
///
/// A later grant overwrites an earlier one on every flag it sets.
pub fn overlay_for_path(
    grants: &[TemporaryGrant],
    path: &str,
    now: DateTime<Utc>,
) -> PermissionPatch {
    active_grants(grants, now)
        .filter_map(|grant| grant.patch_for(path))
        .fold(PermissionPatch::new(), |acc, patch| acc.merge(patch))
}

/// Compute the effective permission record for `path`.
///
/// - Without a table, logs an error and denies everything; grants are not
///   consulted.
/// - A path missing from the table starts from an all-false record and logs
///   a warning; active grants still apply.
pub fn effective_permission(
    table: Option<&PermissionTable>,
    grants: &[TemporaryGrant],
    path: &str,
    now: DateTime<Utc>,
) -> PermissionRecord {
    let Some(table) = table else {
        tracing::error!(
            "capability check called without a permission table loaded, check the account's permission table"
        );
        return PermissionRecord::DENY_ALL;
    };

    let standing = match table.get(path) {
        Some(record) => *record,
        None => {
            tracing::warn!(
                path,
                "invalid or missing permission path {} for the current permission table",
                path
            );
            PermissionRecord::DENY_ALL
        }
    };

    standing.apply(&overlay_for_path(grants, path, now))
}
