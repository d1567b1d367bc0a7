//! # Gatekeeper Permissions
//!
//! Effective-permission computation and the four capability checks.
//!
//! ## Overview
//!
//! A role's standing [`PermissionTable`] gives a base record for each path.
//! An identity's [`TemporaryGrant`]s overlay that base for the paths they
//! name, until they expire. Nothing is precomputed: every capability check
//! merges the two for the one path it is asked about.
//!
//! ## Merge Rules
//!
//! 1. No table loaded: everything is denied and an error is logged.
//! 2. Path missing from the table: the base is all-false and a warning is
//!    logged naming the path.
//! 3. Active grants naming the path are folded in store order; a later
//!    grant overwrites an earlier one flag by flag.
//! 4. The folded overlay is applied over the base. Any flag the overlay
//!    sets wins, including an explicit `false`.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use gatekeeper_core::{PermissionRecord, PermissionTable};
//! use gatekeeper_perms::Permissions;
//!
//! let table = PermissionTable::new()
//!     .with("/admin/x", PermissionRecord::new(true, false, false, true));
//! let perms = Permissions::new(Some(table), Vec::new(), Utc::now());
//!
//! assert!(perms.can_read("/admin/x"));
//! assert!(!perms.can_create("/admin/x"));
//! ```
//!
//! [`PermissionTable`]: gatekeeper_core::PermissionTable
//! [`TemporaryGrant`]: gatekeeper_core::TemporaryGrant

pub mod checker;
pub mod merge;
pub mod overlay;

pub use checker::Permissions;
pub use merge::{effective_permission, overlay_for_path};
pub use overlay::{active_grants, retain_active};
