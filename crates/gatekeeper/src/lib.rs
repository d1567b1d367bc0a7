//! # Gatekeeper
//!
//! Per-request authorization: decides which role an identity acts under,
//! loads that role's permission table for the account, overlays the
//! identity's temporary grants and exposes four capability checks.
//!
//! ## Overview
//!
//! - **Role resolution**: from the identity's role claim or from the
//!   identity store; a configured test identity always gets the test role.
//! - **Table loading**: one standing table per (account, role).
//! - **Grant overlay**: time-limited partial records layered over the table
//!   until they expire.
//! - **Capability checks**: `can_read`, `can_create`, `can_update` and
//!   `can_delete` per resource path, merged on demand.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use gatekeeper::{AccountContext, Enhancer, EnhancerConfig, Identity, RequestContext};
//! use gatekeeper::store::SqliteStore;
//!
//! async fn example() -> gatekeeper::Result<()> {
//!     let store = Arc::new(SqliteStore::open("gatekeeper.db")?);
//!     let enhancer = Enhancer::builder()
//!         .config(EnhancerConfig::default())
//!         .store(store)
//!         .build()?;
//!
//!     let mut request = RequestContext::new()
//!         .with_account(AccountContext::new("acc1"))
//!         .with_identity(Identity::new("u1").with_role("administrator"));
//!     enhancer.enhance(&mut request).await?;
//!
//!     if let Some(perms) = request.permissions() {
//!         if perms.can_update("/admin/users") {
//!             // ...
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `gatekeeper::core` - ids, records, tables and grants
//! - `gatekeeper::perms` - merging and the capability checker
//! - `gatekeeper::store` - store traits, in-memory and SQLite backends

pub mod config;
pub mod enhancer;
pub mod error;
pub mod loader;
pub mod overlay;
pub mod request;
pub mod resolver;

pub use gatekeeper_core as core;
pub use gatekeeper_perms as perms;
pub use gatekeeper_store as store;

pub use config::{EnhancerConfig, Policy, RoleResolutionMode, TestIdentity};
pub use enhancer::{Enhancer, EnhancerBuilder};
pub use error::{AuthorizeError, Result};
pub use loader::PermissionTableLoader;
pub use overlay::TemporaryGrantOverlay;
pub use request::{EnhanceOutcome, EnhanceState, EnhancedIdentity, RequestContext};
pub use resolver::RoleResolver;

pub use gatekeeper_core::{
    AccountContext, AccountId, Action, Identity, IdentityId, PermissionRecord, PermissionTable,
    RoleId, TemporaryGrant,
};
pub use gatekeeper_perms::Permissions;
