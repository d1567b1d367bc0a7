//! Permission table loading.

use std::sync::Arc;

use gatekeeper_core::{AccountId, PermissionTable, RoleId};
use gatekeeper_store::PermissionStore;

use crate::config::Policy;
use crate::error::{AuthorizeError, Result};

/// Fetches the standing table of an (account, role) pair.
pub struct PermissionTableLoader {
    store: Arc<dyn PermissionStore>,
    policy: Policy,
}

impl PermissionTableLoader {
    pub fn new(store: Arc<dyn PermissionStore>, policy: Policy) -> Self {
        Self { store, policy }
    }

    /// Load the table for `account_id` under `role`.
    ///
    /// - no role (or an empty one): `Ok(None)`, the store is not queried
    /// - the test role without a stored table: an empty table
    /// - any other role without a table: `MissingPermissions` under the
    ///   strict policy, an empty table under the lenient one
    pub async fn load(
        &self,
        account_id: &AccountId,
        role: Option<&RoleId>,
    ) -> Result<Option<PermissionTable>> {
        let role = match role.filter(|role| !role.is_empty()) {
            Some(role) => role,
            None => return Ok(None),
        };

        if let Some(table) = self.store.find_permission_table(account_id, role).await? {
            tracing::debug!(
                account_id = %account_id,
                role_id = %role,
                paths = table.len(),
                "loaded permission table"
            );
            return Ok(Some(table));
        }

        if role.is_test() {
            return Ok(Some(PermissionTable::new()));
        }

        match self.policy {
            Policy::Strict => Err(AuthorizeError::MissingPermissions {
                account_id: account_id.clone(),
                role_id: role.clone(),
            }),
            Policy::Lenient => {
                tracing::warn!(
                    account_id = %account_id,
                    role_id = %role,
                    "no permission table for role, continuing with an empty one"
                );
                Ok(Some(PermissionTable::new()))
            }
        }
    }
}
