//! Proptest generators for property-based testing.
//!
//! Paths are drawn from a small fixed set so tables, grants and queries
//! collide often enough to exercise the merge.

use proptest::prelude::*;

use chrono::{DateTime, Duration, Utc};

use gatekeeper_core::{Action, PermissionPatch, PermissionRecord, PermissionTable, TemporaryGrant};

/// Paths used by the generators.
pub const PATHS: [&str; 4] = ["/admin/x", "/admin/users", "/reports", "/settings/billing"];

/// Generate a path from [`PATHS`].
pub fn path() -> impl Strategy<Value = String> {
    prop::sample::select(PATHS.to_vec()).prop_map(str::to_string)
}

/// Generate an action.
pub fn action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

/// Generate a full record.
pub fn record() -> impl Strategy<Value = PermissionRecord> {
    any::<[bool; 4]>().prop_map(|[read, create, update, delete]| {
        PermissionRecord::new(read, create, update, delete)
    })
}

/// Generate a partial record, each flag independently absent, true or false.
pub fn patch() -> impl Strategy<Value = PermissionPatch> {
    any::<[Option<bool>; 4]>().prop_map(|flags| {
        Action::ALL
            .iter()
            .zip(flags)
            .fold(PermissionPatch::new(), |patch, (action, flag)| match flag {
                Some(allowed) => patch.with(*action, allowed),
                None => patch,
            })
    })
}

/// Generate a table over a subset of [`PATHS`].
pub fn table() -> impl Strategy<Value = PermissionTable> {
    prop::collection::btree_map(path(), record(), 0..=PATHS.len())
        .prop_map(|entries| entries.into_iter().collect())
}

/// Generate a grant expiring within an hour either side of `now`,
/// occasionally exactly at `now`.
pub fn grant(now: DateTime<Utc>) -> impl Strategy<Value = TemporaryGrant> {
    (
        "[a-z]{1,8}",
        prop::collection::btree_map(path(), patch(), 1..=PATHS.len()),
        prop_oneof![
            1 => Just(0i64),
            8 => -3600i64..=3600i64,
        ],
    )
        .prop_map(move |(name, permissions, offset)| {
            permissions.into_iter().fold(
                TemporaryGrant::new(name, now + Duration::seconds(offset)),
                |grant, (path, patch)| grant.with_path(path, patch),
            )
        })
}

/// Generate up to `max` grants around `now`.
pub fn grants(now: DateTime<Utc>, max: usize) -> impl Strategy<Value = Vec<TemporaryGrant>> {
    prop::collection::vec(grant(now), 0..=max)
}
