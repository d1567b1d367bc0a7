//! # Gatekeeper Store
//!
//! Storage abstraction for Gatekeeper. The authorization core reads through
//! three async traits and never cares which backend answers:
//!
//! - [`PermissionStore`] - standing permission tables per (account, role)
//! - [`GrantStore`] - temporary grants per identity, in insertion order
//! - [`IdentityStore`] - stored identities with their roles
//!
//! [`Store`] is implemented by anything that provides all three.
//!
//! ## Backends
//!
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and embedding
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gatekeeper_core::{AccountId, RoleId};
//! use gatekeeper_store::{PermissionStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("gatekeeper.db").unwrap();
//!
//!     let table = store
//!         .find_permission_table(&AccountId::new("acc1"), &RoleId::new("administrator"))
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Grant order**: grants come back in the order they were appended. The
//!   merge rule "later grant wins" depends on it.
//! - **Not found is not an error** for reads: a missing table is `None`, a
//!   missing identity has no grants.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{GrantStore, IdentityStore, PermissionStore, Store};
