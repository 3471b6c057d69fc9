//! Promotions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// A discount attributed either to a single item or to the whole order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion id
    pub id: EntityId,

    /// Display title
    pub title: String,

    /// Discount amount
    pub amount: Decimal,
}

impl Promotion {
    /// Creates a new promotion.
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            amount,
        }
    }
}

/// Sums the amounts of the given promotions.
pub fn total_amount(promotions: &[Promotion]) -> Decimal {
    promotions.iter().map(|promotion| promotion.amount).sum()
}
