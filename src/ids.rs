//! Identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an item, owner or promotion.
///
/// Backends hand out either numeric or string ids, so both are accepted and
/// serialized without a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric id
    Number(i64),

    /// String id
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(id) => write!(f, "{id}"),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Number(id)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        EntityId::Number(i64::from(id))
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId::Number(i64::from(id))
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Text(id)
    }
}

impl From<&EntityId> for EntityId {
    fn from(id: &EntityId) -> Self {
        id.clone()
    }
}
