//! Identities and account contexts.

use serde::{Deserialize, Serialize};

use crate::grant::TemporaryGrant;
use crate::types::{AccountId, IdentityId, RoleId};

/// The authenticated caller of a unit of work, as produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleId>,
}

impl Identity {
    /// Create an identity without a role claim.
    pub fn new(id: impl Into<IdentityId>) -> Self {
        Self {
            id: id.into(),
            role: None,
        }
    }

    /// Attach a role claim.
    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Tenant scope of a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountContext {
    #[serde(rename = "accountId")]
    pub account_id: AccountId,
}

impl AccountContext {
    pub fn new(account_id: impl Into<AccountId>) -> Self {
        Self {
            account_id: account_id.into(),
        }
    }
}

/// An identity as kept by the identity store.
///
/// Carries the assigned roles and the identity's temporary grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    #[serde(rename = "_id")]
    pub id: IdentityId,

    /// Assigned roles, primary first. Stored as an object keyed by role name.
    #[serde(default, with = "crate::role_map")]
    pub roles: Vec<RoleId>,

    #[serde(default)]
    pub temporary_permissions: Vec<TemporaryGrant>,
}

impl StoredIdentity {
    /// Create a stored identity with no roles and no grants.
    pub fn new(id: impl Into<IdentityId>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
            temporary_permissions: Vec::new(),
        }
    }

    /// Append a role.
    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Append a temporary grant.
    pub fn with_grant(mut self, grant: TemporaryGrant) -> Self {
        self.temporary_permissions.push(grant);
        self
    }

    /// The role that decides this identity's permissions: the first one
    /// assigned. `None` if there is none or it is empty.
    pub fn primary_role(&self) -> Option<&RoleId> {
        self.roles.first().filter(|role| !role.is_empty())
    }
}
