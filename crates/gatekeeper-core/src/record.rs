//! Permission records and partial records.
//!
//! A [`PermissionRecord`] is the standing permission for one resource path.
//! A [`PermissionPatch`] is the partial record carried by a temporary grant:
//! only the flags it sets take part in a merge, and an explicit `false` is
//! distinct from an absent flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An action verb a capability check can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// All actions, in record field order.
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    /// Lowercase name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standing permission for one resource path.
///
/// Flags missing from a stored document deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRecord {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl PermissionRecord {
    /// A record that allows nothing.
    pub const DENY_ALL: Self = Self {
        read: false,
        create: false,
        update: false,
        delete: false,
    };

    /// A record that allows every action.
    pub const ALLOW_ALL: Self = Self {
        read: true,
        create: true,
        update: true,
        delete: true,
    };

    /// Create a record from its four flags.
    pub const fn new(read: bool, create: bool, update: bool, delete: bool) -> Self {
        Self {
            read,
            create,
            update,
            delete,
        }
    }

    /// Whether this record allows the given action.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.read,
            Action::Create => self.create,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }

    /// Return a copy with one flag set.
    pub fn with(mut self, action: Action, allowed: bool) -> Self {
        match action {
            Action::Read => self.read = allowed,
            Action::Create => self.create = allowed,
            Action::Update => self.update = allowed,
            Action::Delete => self.delete = allowed,
        }
        self
    }

    /// Overlay a patch: every flag the patch sets replaces ours.
    pub fn apply(self, patch: &PermissionPatch) -> Self {
        Self {
            read: patch.read.unwrap_or(self.read),
            create: patch.create.unwrap_or(self.create),
            update: patch.update.unwrap_or(self.update),
            delete: patch.delete.unwrap_or(self.delete),
        }
    }
}

/// A partial permission record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl PermissionPatch {
    /// An empty patch (sets nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with one flag set.
    pub fn with(mut self, action: Action, allowed: bool) -> Self {
        match action {
            Action::Read => self.read = Some(allowed),
            Action::Create => self.create = Some(allowed),
            Action::Update => self.update = Some(allowed),
            Action::Delete => self.delete = Some(allowed),
        }
        self
    }

    /// The flag this patch sets for an action, if any.
    pub fn get(&self, action: Action) -> Option<bool> {
        match action {
            Action::Read => self.read,
            Action::Create => self.create,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }

    /// Whether the patch sets no flag at all.
    pub fn is_empty(&self) -> bool {
        Action::ALL.iter().all(|a| self.get(*a).is_none())
    }

    /// Shallow merge: flags set in `later` overwrite ours.
    pub fn merge(self, later: &PermissionPatch) -> Self {
        Self {
            read: later.read.or(self.read),
            create: later.create.or(self.create),
            update: later.update.or(self.update),
            delete: later.delete.or(self.delete),
        }
    }
}

impl From<PermissionRecord> for PermissionPatch {
    fn from(record: PermissionRecord) -> Self {
        Self {
            read: Some(record.read),
            create: Some(record.create),
            update: Some(record.update),
            delete: Some(record.delete),
        }
    }
}
