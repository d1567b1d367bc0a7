//! Per-request authorization state.

use gatekeeper_core::{AccountContext, Action, Identity, PermissionRecord};
use gatekeeper_perms::Permissions;

/// Lifecycle of a request's authorization state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnhanceState {
    #[default]
    NotEnhanced,
    Enhancing,
    Enhanced,
    Failed,
}

/// What [`Enhancer::enhance`](crate::Enhancer::enhance) did to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceOutcome {
    /// The request lacked an account or an identity; nothing was loaded.
    Skipped,
    /// Permissions were loaded and attached.
    Enhanced,
}

/// An identity together with the permissions loaded for it.
///
/// The identity itself is left as it came in; the capability checks live on
/// the attached [`Permissions`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedIdentity {
    identity: Identity,
    permissions: Permissions,
}

impl EnhancedIdentity {
    pub fn new(identity: Identity, permissions: Permissions) -> Self {
        Self {
            identity,
            permissions,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn into_parts(self) -> (Identity, Permissions) {
        (self.identity, self.permissions)
    }

    pub fn effective(&self, path: &str) -> PermissionRecord {
        self.permissions.effective(path)
    }

    pub fn can(&self, action: Action, path: &str) -> bool {
        self.permissions.can(action, path)
    }

    pub fn can_read(&self, path: &str) -> bool {
        self.permissions.can_read(path)
    }

    pub fn can_create(&self, path: &str) -> bool {
        self.permissions.can_create(path)
    }

    pub fn can_update(&self, path: &str) -> bool {
        self.permissions.can_update(path)
    }

    pub fn can_delete(&self, path: &str) -> bool {
        self.permissions.can_delete(path)
    }
}

/// The slice of a request the enhancer reads and writes.
///
/// Account and identity are set by earlier request handling. Permissions
/// are only ever attached by the enhancer, all at once.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub account: Option<AccountContext>,
    pub identity: Option<Identity>,
    permissions: Option<Permissions>,
    state: EnhanceState,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: AccountContext) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Permissions attached by a successful enhancement.
    pub fn permissions(&self) -> Option<&Permissions> {
        self.permissions.as_ref()
    }

    pub fn is_enhanced(&self) -> bool {
        self.state == EnhanceState::Enhanced
    }

    pub fn state(&self) -> EnhanceState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: EnhanceState) {
        self.state = state;
    }

    pub(crate) fn attach(&mut self, permissions: Permissions) {
        self.permissions = Some(permissions);
        self.state = EnhanceState::Enhanced;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatekeeper_core::PermissionTable;

    #[test]
    fn test_new_request_is_not_enhanced() {
        let request = RequestContext::new()
            .with_account(AccountContext::new("acc1"))
            .with_identity(Identity::new("u1"));

        assert_eq!(request.state(), EnhanceState::NotEnhanced);
        assert!(!request.is_enhanced());
        assert!(request.permissions().is_none());
    }

    #[test]
    fn test_attach_marks_enhanced() {
        let mut request = RequestContext::new();
        request.set_state(EnhanceState::Enhancing);
        request.attach(Permissions::new(Some(PermissionTable::new()), Vec::new(), Utc::now()));

        assert!(request.is_enhanced());
        assert!(request.permissions().is_some());
    }

    #[test]
    fn test_enhanced_identity_delegates() {
        let table = PermissionTable::new().with("/p", PermissionRecord::new(true, false, false, false));
        let enhanced = EnhancedIdentity::new(
            Identity::new("u1").with_role("viewer"),
            Permissions::new(Some(table), Vec::new(), Utc::now()),
        );

        assert!(enhanced.can_read("/p"));
        assert!(!enhanced.can(Action::Delete, "/p"));
        assert_eq!(enhanced.identity().id.as_str(), "u1");

        let (identity, permissions) = enhanced.into_parts();
        assert_eq!(identity.role.as_ref().map(|r| r.as_str()), Some("viewer"));
        assert!(permissions.table().is_some());
    }
}
