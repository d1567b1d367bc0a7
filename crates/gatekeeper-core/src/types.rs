//! Strong type definitions for Gatekeeper.
//!
//! Identifiers are opaque strings wrapped in newtypes so that an account id
//! can never be passed where a role id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to the configured test identity.
///
/// The test role bypasses role resolution and is exempt from the
/// missing-permission-table check.
pub const TEST_ROLE: &str = "test-role";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Consume and return the raw identifier.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of an authenticated caller.
    IdentityId
);

string_id!(
    /// Identifier of the tenant under which permissions are evaluated.
    AccountId
);

string_id!(
    /// Identifier of a role; one permission table exists per (account, role).
    RoleId
);

impl RoleId {
    /// The sentinel role of the configured test identity.
    pub fn test() -> Self {
        Self(TEST_ROLE.to_string())
    }

    /// Whether this is the test sentinel role.
    pub fn is_test(&self) -> bool {
        self.0 == TEST_ROLE
    }
}
