//! Capability checks bound to one request's permission data.

use chrono::{DateTime, Utc};

use gatekeeper_core::{Action, PermissionRecord, PermissionTable, TemporaryGrant};

use crate::merge::effective_permission;
use crate::overlay::active_grants;

/// The permission data loaded for one identity in one request, plus the four
/// capability checks over it.
///
/// Immutable once built. Every check merges the standing table and the
/// grants active at [`evaluated_at`](Self::evaluated_at) for the queried path,
/// so repeated checks return the same answer and never reach a store.
///
/// Paths are plain strings such as `"/admin/can/read"`. Checks never fail:
/// a missing table or path resolves to `false` and is logged.
#[derive(Debug, Clone, PartialEq)]
pub struct Permissions {
    table: Option<PermissionTable>,
    grants: Vec<TemporaryGrant>,
    evaluated_at: DateTime<Utc>,
}

impl Permissions {
    /// Bind loaded data to the instant grants are evaluated against.
    ///
    /// `grants` is the identity's full grant list; expired entries are kept
    /// but never take effect.
    pub fn new(
        table: Option<PermissionTable>,
        grants: Vec<TemporaryGrant>,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            table,
            grants,
            evaluated_at,
        }
    }

    /// The standing table, if one was loaded.
    pub fn table(&self) -> Option<&PermissionTable> {
        self.table.as_ref()
    }

    /// Every grant loaded for the identity, expired ones included.
    pub fn temporary_grants(&self) -> &[TemporaryGrant] {
        &self.grants
    }

    /// Grants active at the evaluation instant.
    pub fn active_grants(&self) -> impl Iterator<Item = &TemporaryGrant> {
        active_grants(&self.grants, self.evaluated_at)
    }

    pub fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }

    /// The merged record for a path.
    pub fn effective(&self, path: &str) -> PermissionRecord {
        effective_permission(self.table.as_ref(), &self.grants, path, self.evaluated_at)
    }

    /// Whether `action` is allowed on `path`.
    pub fn can(&self, action: Action, path: &str) -> bool {
        self.effective(path).allows(action)
    }

    /// Whether the identity can read `path`.
    pub fn can_read(&self, path: &str) -> bool {
        self.can(Action::Read, path)
    }

    /// Whether the identity can create under `path`.
    pub fn can_create(&self, path: &str) -> bool {
        self.can(Action::Create, path)
    }

    /// Whether the identity can update `path`.
    pub fn can_update(&self, path: &str) -> bool {
        self.can(Action::Update, path)
    }

    /// Whether the identity can delete `path`.
    pub fn can_delete(&self, path: &str) -> bool {
        self.can(Action::Delete, path)
    }
}
