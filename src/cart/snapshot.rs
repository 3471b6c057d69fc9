//! Cart snapshots

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{items::CartItem, owners::CartOwner, promotions::Promotion};

/// Serializable state of a cart, the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// ISO currency code
    pub currency: String,

    /// Culture, e.g. `en` or `zh-Hans`
    pub culture: String,

    /// Owner of the cart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<CartOwner>,

    /// Items
    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Order-level promotions
    #[serde(default)]
    pub promotions: Vec<Promotion>,

    /// Opaque checkout form state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<Value>,
}

impl CartSnapshot {
    /// Creates an empty snapshot.
    pub fn new(currency: impl Into<String>, culture: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            culture: culture.into(),
            owner: None,
            items: Vec::new(),
            promotions: Vec::new(),
            form_data: None,
        }
    }
}
