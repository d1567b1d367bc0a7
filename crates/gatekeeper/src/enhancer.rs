//! The authorization enhancer.
//!
//! Ties role resolution, table loading and grant loading together and
//! attaches the result to a request.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use gatekeeper_core::{AccountContext, Identity};
use gatekeeper_perms::Permissions;
use gatekeeper_store::{GrantStore, IdentityStore, PermissionStore, Store};

use crate::config::{EnhancerConfig, RoleResolutionMode};
use crate::error::{AuthorizeError, Result};
use crate::loader::PermissionTableLoader;
use crate::overlay::TemporaryGrantOverlay;
use crate::request::{EnhanceOutcome, EnhanceState, EnhancedIdentity, RequestContext};
use crate::resolver::RoleResolver;

/// Builder for [`Enhancer`].
///
/// The permission and grant stores are required. The identity store is
/// required only when roles are looked up by identity id.
#[derive(Default)]
pub struct EnhancerBuilder {
    config: EnhancerConfig,
    permissions: Option<Arc<dyn PermissionStore>>,
    grants: Option<Arc<dyn GrantStore>>,
    identities: Option<Arc<dyn IdentityStore>>,
}

impl EnhancerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EnhancerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use one backend for every store.
    pub fn store<S: Store + 'static>(self, store: Arc<S>) -> Self {
        let permissions: Arc<dyn PermissionStore> = store.clone();
        let grants: Arc<dyn GrantStore> = store.clone();
        let identities: Arc<dyn IdentityStore> = store;
        self.permission_store(permissions)
            .grant_store(grants)
            .identity_store(identities)
    }

    pub fn permission_store(mut self, store: Arc<dyn PermissionStore>) -> Self {
        self.permissions = Some(store);
        self
    }

    pub fn grant_store(mut self, store: Arc<dyn GrantStore>) -> Self {
        self.grants = Some(store);
        self
    }

    pub fn identity_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.identities = Some(store);
        self
    }

    /// Validate the collaborators and build the enhancer.
    pub fn build(self) -> Result<Enhancer> {
        let permissions = self
            .permissions
            .ok_or(AuthorizeError::MissingDependency("permission store"))?;
        let grants = self
            .grants
            .ok_or(AuthorizeError::MissingDependency("grant store"))?;

        let identities = match self.config.role_resolution {
            RoleResolutionMode::FromClaim => None,
            RoleResolutionMode::FromStoreLookup => self.identities,
        };

        Ok(Enhancer {
            resolver: RoleResolver::new(self.config.clone(), identities)?,
            loader: PermissionTableLoader::new(permissions, self.config.missing_permissions),
            overlay: TemporaryGrantOverlay::new(grants),
            config: self.config,
        })
    }
}

/// Loads an identity's permissions and attaches them to its request.
///
/// Holds no per-request state: one enhancer serves any number of
/// concurrent requests, and every call reads fresh from the stores.
pub struct Enhancer {
    config: EnhancerConfig,
    resolver: RoleResolver,
    loader: PermissionTableLoader,
    overlay: TemporaryGrantOverlay,
}

impl Enhancer {
    pub fn builder() -> EnhancerBuilder {
        EnhancerBuilder::new()
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity Enhancement
    // ─────────────────────────────────────────────────────────────────────────

    /// Load the permissions of `identity` within `account`, evaluated now.
    pub async fn enhance_identity(
        &self,
        account: &AccountContext,
        identity: &Identity,
    ) -> Result<EnhancedIdentity> {
        self.enhance_identity_at(account, identity, Utc::now()).await
    }

    /// Load the permissions of `identity` within `account`, with grants
    /// evaluated against `now`.
    ///
    /// The table and the grants are fetched concurrently once the role is
    /// known. Either fetch failing fails the whole call.
    pub async fn enhance_identity_at(
        &self,
        account: &AccountContext,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<EnhancedIdentity> {
        let role = self.resolver.resolve(identity).await?;

        let (table, grants) = tokio::try_join!(
            self.loader.load(&account.account_id, role.as_ref()),
            self.overlay.load_grants(&identity.id),
        )?;

        Ok(EnhancedIdentity::new(
            identity.clone(),
            Permissions::new(table, grants, now),
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request Enhancement
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach permissions to `request`, evaluated now.
    pub async fn enhance(&self, request: &mut RequestContext) -> Result<EnhanceOutcome> {
        self.enhance_at(request, Utc::now()).await
    }

    /// Attach permissions to `request`, with grants evaluated against `now`.
    ///
    /// A request without an account or an identity passes through untouched.
    /// On failure the error is logged once and returned; nothing is attached.
    pub async fn enhance_at(
        &self,
        request: &mut RequestContext,
        now: DateTime<Utc>,
    ) -> Result<EnhanceOutcome> {
        let (account, identity) = match (&request.account, &request.identity) {
            (Some(account), Some(identity)) => (account.clone(), identity.clone()),
            _ => {
                tracing::debug!("request has no account or identity, skipping enhancement");
                return Ok(EnhanceOutcome::Skipped);
            }
        };

        request.set_state(EnhanceState::Enhancing);

        match self.enhance_identity_at(&account, &identity, now).await {
            Ok(enhanced) => {
                let (_, permissions) = enhanced.into_parts();
                request.attach(permissions);
                Ok(EnhanceOutcome::Enhanced)
            }
            Err(err) => {
                tracing::error!(
                    account_id = %account.account_id,
                    identity_id = %identity.id,
                    error = %err,
                    "failed to load permissions"
                );
                request.set_state(EnhanceState::Failed);
                Err(err)
            }
        }
    }

    /// Enhance `request`, then hand the outcome to `continuation`: `None` to
    /// continue, the error to abort.
    pub async fn next<F, T>(&self, request: &mut RequestContext, continuation: F) -> T
    where
        F: FnOnce(Option<&AuthorizeError>) -> T,
    {
        match self.enhance(request).await {
            Ok(_) => continuation(None),
            Err(err) => continuation(Some(&err)),
        }
    }
}
