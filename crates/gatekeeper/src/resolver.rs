//! Role resolution.

use std::sync::Arc;

use gatekeeper_core::{Identity, RoleId};
use gatekeeper_store::IdentityStore;

use crate::config::{EnhancerConfig, Policy, RoleResolutionMode};
use crate::error::{AuthorizeError, Result};

/// Determines the role an identity's permissions are looked up under.
pub struct RoleResolver {
    config: EnhancerConfig,
    identities: Option<Arc<dyn IdentityStore>>,
}

impl RoleResolver {
    /// Create a resolver.
    ///
    /// An identity store is required when roles are looked up by id.
    pub fn new(config: EnhancerConfig, identities: Option<Arc<dyn IdentityStore>>) -> Result<Self> {
        if config.role_resolution == RoleResolutionMode::FromStoreLookup && identities.is_none() {
            return Err(AuthorizeError::MissingDependency("identity store"));
        }
        Ok(Self { config, identities })
    }

    /// Resolve the role of `identity`.
    ///
    /// The test identity always gets the test role without touching the
    /// store. Returns `Ok(None)` for a roleless identity under the lenient
    /// policy.
    pub async fn resolve(&self, identity: &Identity) -> Result<Option<RoleId>> {
        if self.config.is_test_identity(&identity.id) {
            tracing::debug!(identity_id = %identity.id, "test identity, using the test role");
            return Ok(Some(RoleId::test()));
        }

        let role = match self.config.role_resolution {
            RoleResolutionMode::FromClaim => identity.role.clone(),
            RoleResolutionMode::FromStoreLookup => self.lookup(identity).await?,
        };

        match role.filter(|role| !role.is_empty()) {
            Some(role) => {
                tracing::debug!(identity_id = %identity.id, role_id = %role, "resolved role");
                Ok(Some(role))
            }
            None => match self.config.missing_role {
                Policy::Strict => Err(AuthorizeError::MissingRole {
                    identity_id: identity.id.clone(),
                }),
                Policy::Lenient => {
                    tracing::debug!(identity_id = %identity.id, "identity has no role");
                    Ok(None)
                }
            },
        }
    }

    async fn lookup(&self, identity: &Identity) -> Result<Option<RoleId>> {
        let store = self
            .identities
            .as_ref()
            .ok_or(AuthorizeError::MissingDependency("identity store"))?;

        let stored = store
            .find_identity(&identity.id)
            .await?
            .ok_or_else(|| AuthorizeError::UserNotFound(identity.id.clone()))?;

        Ok(stored.primary_role().cloned())
    }
}
