//! Reference scenarios with known expected outcomes.
//!
//! Each scenario describes what is stored, who asks, and which capability
//! checks must come out which way. Expiry is relative to the `now` the
//! scenarios are built for, so they hold at any wall-clock time.

use chrono::{DateTime, Duration, Utc};

use gatekeeper_core::{
    AccountContext, Action, Identity, IdentityId, PermissionDocument, PermissionPatch,
    PermissionRecord, PermissionTable, RoleId, StoredIdentity, TemporaryGrant,
};
use gatekeeper_perms::Permissions;
use gatekeeper_store::{IdentityStore, PermissionStore, Result as StoreResult};

/// Account all scenarios run under.
pub const ACCOUNT: &str = "acc1";

/// Path all scenarios query.
pub const PATH: &str = "/admin/x";

/// Identity configured as the test identity in [`test_identity_without_table`].
pub const TEST_IDENTITY: &str = "66d8a8e0530153052b3953fc";

/// One expected capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub action: Action,
    pub path: &'static str,
    pub allowed: bool,
}

impl Expectation {
    pub const fn new(action: Action, path: &'static str, allowed: bool) -> Self {
        Self {
            action,
            path,
            allowed,
        }
    }
}

/// A scenario: stored data, the asking identity and the expected answers.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub account: AccountContext,
    pub identity: Identity,
    /// Identity to configure as the test identity, if any.
    pub test_identity: Option<IdentityId>,
    /// Standing table stored for (account, role), if any.
    pub table: Option<(RoleId, PermissionTable)>,
    /// Grants stored on the identity, in append order.
    pub grants: Vec<TemporaryGrant>,
    /// Whether enhancement must attach an empty table.
    pub expects_empty_table: bool,
    pub expectations: Vec<Expectation>,
}

impl Scenario {
    /// Write the scenario's table and identity to `store`.
    pub async fn seed<S>(&self, store: &S) -> StoreResult<()>
    where
        S: PermissionStore + IdentityStore,
    {
        if let Some((role, table)) = &self.table {
            store
                .save_permission_table(&PermissionDocument::new(
                    self.account.account_id.clone(),
                    role.clone(),
                    table.clone(),
                ))
                .await?;
        }

        let mut stored = StoredIdentity::new(self.identity.id.clone());
        stored.roles.extend(self.identity.role.clone());
        stored.temporary_permissions = self.grants.clone();
        store.save_identity(&stored).await
    }

    /// Check `permissions` against the expectations.
    ///
    /// Returns one line per mismatch; empty when everything matches.
    pub fn verify(&self, permissions: &Permissions) -> Vec<String> {
        let mut mismatches: Vec<String> = self
            .expectations
            .iter()
            .filter_map(|e| {
                let actual = permissions.can(e.action, e.path);
                (actual != e.allowed).then(|| {
                    format!(
                        "{}: {} on {} expected {}, got {}",
                        self.name, e.action, e.path, e.allowed, actual
                    )
                })
            })
            .collect();

        if self.expects_empty_table && permissions.table().map_or(true, |t| !t.is_empty()) {
            mismatches.push(format!("{}: expected an empty table, got {:?}", self.name, permissions.table()));
        }

        mismatches
    }
}

fn administrator_table() -> (RoleId, PermissionTable) {
    (
        RoleId::new("administrator"),
        PermissionTable::new().with(PATH, PermissionRecord::new(true, false, false, true)),
    )
}

fn create_grant(expires: DateTime<Utc>) -> TemporaryGrant {
    TemporaryGrant::new("grantCreate", expires)
        .with_path(PATH, PermissionPatch::new().with(Action::Create, true))
}

fn administrator() -> Identity {
    Identity::new("u1").with_role("administrator")
}

/// Standing table only.
pub fn standing_table_only() -> Scenario {
    Scenario {
        name: "standing table only",
        account: AccountContext::new(ACCOUNT),
        identity: administrator(),
        test_identity: None,
        table: Some(administrator_table()),
        grants: Vec::new(),
        expects_empty_table: false,
        expectations: vec![
            Expectation::new(Action::Read, PATH, true),
            Expectation::new(Action::Create, PATH, false),
            Expectation::new(Action::Update, PATH, false),
            Expectation::new(Action::Delete, PATH, true),
        ],
    }
}

/// Standing table plus an active grant adding `create`.
pub fn active_grant(now: DateTime<Utc>) -> Scenario {
    Scenario {
        name: "active grant",
        grants: vec![create_grant(now + Duration::days(1))],
        expectations: vec![
            Expectation::new(Action::Read, PATH, true),
            Expectation::new(Action::Create, PATH, true),
            Expectation::new(Action::Update, PATH, false),
            Expectation::new(Action::Delete, PATH, true),
        ],
        ..standing_table_only()
    }
}

/// Standing table plus the same grant, already expired.
pub fn expired_grant(now: DateTime<Utc>) -> Scenario {
    Scenario {
        name: "expired grant",
        grants: vec![create_grant(now - Duration::days(1))],
        ..standing_table_only()
    }
}

/// The test identity, with no table stored for the test role.
pub fn test_identity_without_table() -> Scenario {
    Scenario {
        name: "test identity without table",
        account: AccountContext::new(ACCOUNT),
        identity: Identity::new(TEST_IDENTITY),
        test_identity: Some(IdentityId::new(TEST_IDENTITY)),
        table: None,
        grants: Vec::new(),
        expects_empty_table: true,
        expectations: Action::ALL
            .iter()
            .map(|action| Expectation::new(*action, PATH, false))
            .collect(),
    }
}

/// All scenarios, with expiry relative to `now`.
pub fn all_scenarios(now: DateTime<Utc>) -> Vec<Scenario> {
    vec![
        standing_table_only(),
        active_grant(now),
        expired_grant(now),
        test_identity_without_table(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeeper_store::MemoryStore;

    fn permissions_for(scenario: &Scenario, now: DateTime<Utc>) -> Permissions {
        let table = match (&scenario.table, &scenario.test_identity) {
            (Some((_, table)), _) => Some(table.clone()),
            (None, Some(_)) => Some(PermissionTable::new()),
            (None, None) => None,
        };
        Permissions::new(table, scenario.grants.clone(), now)
    }

    #[test]
    fn test_scenarios_hold_against_the_merge() {
        let now = Utc::now();
        for scenario in all_scenarios(now) {
            let mismatches = scenario.verify(&permissions_for(&scenario, now));
            assert!(mismatches.is_empty(), "{:?}", mismatches);
        }
    }

    #[test]
    fn test_verify_reports_mismatches() {
        let now = Utc::now();
        let scenario = active_grant(now);
        let without_grant = Permissions::new(scenario.table.clone().map(|(_, t)| t), Vec::new(), now);

        let mismatches = scenario.verify(&without_grant);
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].contains("create"));
    }

    #[tokio::test]
    async fn test_seed_writes_table_and_grants() {
        let now = Utc::now();
        let scenario = active_grant(now);
        let store = MemoryStore::new();
        scenario.seed(&store).await.unwrap();

        let stored = store.find_identity(&scenario.identity.id).await.unwrap().unwrap();
        assert_eq!(stored.primary_role(), Some(&RoleId::new("administrator")));
        assert_eq!(stored.temporary_permissions.len(), 1);

        let table = store
            .find_permission_table(&scenario.account.account_id, &RoleId::new("administrator"))
            .await
            .unwrap();
        assert!(table.is_some());
    }
}
