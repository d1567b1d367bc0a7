//! # Gatekeeper Testkit
//!
//! Testing utilities for Gatekeeper.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenarios**: stored data plus expected capability checks, for
//!   end-to-end verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: a seeded in-memory store, plus store wrappers that count
//!   or fail calls
//! - **Log capture**: a `tracing` layer that records events for assertions
//!
//! ## Scenarios
//!
//! ```rust
//! use chrono::Utc;
//! use gatekeeper_core::PermissionTable;
//! use gatekeeper_perms::Permissions;
//! use gatekeeper_testkit::scenarios::standing_table_only;
//!
//! let scenario = standing_table_only();
//! let table = scenario.table.clone().map(|(_, table)| table);
//! let perms = Permissions::new(table, Vec::new(), Utc::now());
//! assert!(scenario.verify(&perms).is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use chrono::Utc;
//! use proptest::prelude::*;
//! use gatekeeper_perms::Permissions;
//! use gatekeeper_testkit::generators::{grants, path, table};
//!
//! proptest! {
//!     #[test]
//!     fn checks_are_idempotent(t in table(), g in grants(Utc::now(), 4), p in path()) {
//!         let perms = Permissions::new(Some(t), g, Utc::now());
//!         prop_assert_eq!(perms.effective(&p), perms.effective(&p));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod logs;
pub mod scenarios;

pub use fixtures::{CallCounts, CountingStore, FailingStore, TestFixture};
pub use logs::{CapturedEvent, LogCapture};
pub use scenarios::{all_scenarios, Expectation, Scenario};
