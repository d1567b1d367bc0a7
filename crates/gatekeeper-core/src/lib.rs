//! # Gatekeeper Core
//!
//! Pure data types for the Gatekeeper authorization core: identities,
//! account contexts, permission records, permission tables and temporary
//! grants.
//!
//! This crate contains no I/O, no storage, no logging. It is plain data plus
//! the small amount of logic that belongs to each type.
//!
//! ## Key Types
//!
//! - [`Identity`] - The authenticated caller for a unit of work
//! - [`AccountContext`] - Tenant scope under which permissions are evaluated
//! - [`PermissionRecord`] - Four boolean flags for one resource path
//! - [`PermissionPatch`] - A partial record carried by temporary grants
//! - [`PermissionTable`] - Standing permissions of one (account, role) pair
//! - [`TemporaryGrant`] - Time-bounded supplemental permissions
//!
//! ## Document Shapes
//!
//! Stored permission tables and identities keep the JSON shape used by the
//! document store that feeds them. See [`PermissionDocument`] and
//! [`StoredIdentity`].

pub mod error;
pub mod grant;
pub mod identity;
pub mod record;
pub mod role_map;
pub mod table;
pub mod types;

pub use error::{CoreError, Result};
pub use grant::{parse_timestamp, TemporaryGrant};
pub use identity::{AccountContext, Identity, StoredIdentity};
pub use record::{Action, PermissionPatch, PermissionRecord};
pub use table::{PermissionDocument, PermissionTable};
pub use types::{AccountId, IdentityId, RoleId, TEST_ROLE};
