//! Serde format for an identity's role list.
//!
//! Stored identities keep their roles as an object keyed by role name, in
//! assignment order:
//!
//! ```json
//! { "roles": { "administrator": 1, "agent": 1 } }
//! ```
//!
//! Values are ignored on read and written as `1`. A plain array of role
//! names is read as well. Use with `#[serde(with = "gatekeeper_core::role_map")]`.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserializer, Serializer};

use crate::types::RoleId;

/// Write roles as `{ "<role>": 1, ... }`, keeping their order.
pub fn serialize<S: Serializer>(roles: &[RoleId], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(roles.len()))?;
    for role in roles {
        map.serialize_entry(role.as_str(), &1u8)?;
    }
    map.end()
}

/// Read roles from an object (keys in document order) or an array.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RoleId>, D::Error> {
    deserializer.deserialize_any(RolesVisitor)
}

struct RolesVisitor;

impl<'de> Visitor<'de> for RolesVisitor {
    type Value = Vec<RoleId>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by role name or an array of role names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut roles = Vec::new();
        while let Some((role, IgnoredAny)) = map.next_entry::<String, IgnoredAny>()? {
            roles.push(RoleId::new(role));
        }
        Ok(roles)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut roles = Vec::new();
        while let Some(role) = seq.next_element::<String>()? {
            roles.push(RoleId::new(role));
        }
        Ok(roles)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }
}
