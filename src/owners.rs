//! Cart Owners

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// The customer or supplier a cart belongs to.
///
/// A customer and a supplier sharing the same id are different owners and
/// never share a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOwner {
    /// Owner id
    pub id: EntityId,

    /// Whether the owner is a supplier rather than a customer
    #[serde(default)]
    pub is_supplier: bool,

    /// Preferred culture of the owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<String>,

    /// Preferred currency of the owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl CartOwner {
    /// Creates a customer owner.
    pub fn customer(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            is_supplier: false,
            culture: None,
            currency: None,
        }
    }

    /// Creates a supplier owner.
    pub fn supplier(id: impl Into<EntityId>) -> Self {
        Self {
            is_supplier: true,
            ..Self::customer(id)
        }
    }

    /// Suffix used in the cart identifier, `S{id}` for suppliers and `C{id}` otherwise.
    pub fn key_suffix(&self) -> String {
        let kind = if self.is_supplier { 'S' } else { 'C' };

        format!("{kind}{}", self.id)
    }

    /// Whether `other` scopes to the same cart as this owner.
    pub fn is_same(&self, other: &CartOwner) -> bool {
        self.id == other.id && self.is_supplier == other.is_supplier
    }
}
