//! Enhancer configuration.
//!
//! Readable from JSON. The test identity also accepts the `testUser` /
//! `_id` spelling used by older deployments:
//!
//! ```json
//! { "testUser": { "_id": "66d8a8e0530153052b3953fc" } }
//! ```

use serde::{Deserialize, Serialize};

use gatekeeper_core::IdentityId;

use crate::error::{AuthorizeError, Result};

/// Where an identity's role comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleResolutionMode {
    /// Use the role claim carried by the identity.
    #[default]
    FromClaim,
    /// Look the identity up in the identity store and use its primary role.
    FromStoreLookup,
}

/// How to treat a missing role or a missing permission table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Policy {
    /// Fail the enhancement.
    #[default]
    Strict,
    /// Continue without the missing piece.
    Lenient,
}

/// An identity whose role resolution is bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestIdentity {
    #[serde(alias = "_id")]
    pub id: IdentityId,
}

/// Configuration for the [`Enhancer`](crate::Enhancer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancerConfig {
    /// Identity that always resolves to the test role.
    #[serde(alias = "testUser")]
    pub test_identity: Option<TestIdentity>,

    pub role_resolution: RoleResolutionMode,

    /// Applied when a non-test identity resolves to no role.
    pub missing_role: Policy,

    /// Applied when a non-test role has no permission table.
    pub missing_permissions: Policy,
}

impl EnhancerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AuthorizeError::Config(e.to_string()))
    }

    /// Both policies lenient: missing roles and tables degrade instead of
    /// failing.
    pub fn lenient() -> Self {
        Self {
            missing_role: Policy::Lenient,
            missing_permissions: Policy::Lenient,
            ..Self::default()
        }
    }

    pub fn with_test_identity(mut self, id: impl Into<IdentityId>) -> Self {
        self.test_identity = Some(TestIdentity { id: id.into() });
        self
    }

    pub fn with_role_resolution(mut self, mode: RoleResolutionMode) -> Self {
        self.role_resolution = mode;
        self
    }

    pub fn with_missing_role(mut self, policy: Policy) -> Self {
        self.missing_role = policy;
        self
    }

    pub fn with_missing_permissions(mut self, policy: Policy) -> Self {
        self.missing_permissions = policy;
        self
    }

    /// Whether `id` is the configured test identity.
    pub fn is_test_identity(&self, id: &IdentityId) -> bool {
        self.test_identity
            .as_ref()
            .is_some_and(|test| !test.id.is_empty() && &test.id == id)
    }
}
