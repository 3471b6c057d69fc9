//! Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ids::EntityId, pricing::line_subtotal, promotions::Promotion};

/// A priced line in a cart.
///
/// `subtotal` and `discount` are derived; the cart recomputes them on every
/// mutation so they always match `price`, `qty`, `asset_qty` and `promotions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Item id, unique within a cart when added through [`crate::cart::Cart::push_item`]
    pub id: EntityId,

    /// Catalog name
    pub name: String,

    /// Display title overriding the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Unit price
    pub price: Decimal,

    /// Quantity
    pub qty: Decimal,

    /// Secondary quantity multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_qty: Option<Decimal>,

    /// Promotions applied to this item
    #[serde(default)]
    pub promotions: Vec<Promotion>,

    /// Price after external recalculation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,

    /// `price * qty * asset_qty`
    #[serde(default)]
    pub subtotal: Decimal,

    /// Sum of promotion amounts
    #[serde(default)]
    pub discount: Decimal,

    /// Caller-defined fields carried alongside the item
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    /// Creates an item with no promotions and derived fields already computed.
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        price: Decimal,
        qty: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            price,
            qty,
            asset_qty: None,
            promotions: Vec::new(),
            current_price: None,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            extra: Map::new(),
        }
        .recomputed()
    }

    /// Builds an item from a draft returned by an item creator.
    pub fn from_draft(id: EntityId, draft: ItemDraft, price: Decimal, qty: Decimal) -> Self {
        Self {
            id,
            name: draft.name,
            title: draft.title,
            price,
            qty,
            asset_qty: None,
            promotions: draft.promotions,
            current_price: None,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            extra: draft.extra,
        }
        .recomputed()
    }

    /// Sets the asset quantity.
    #[must_use]
    pub fn with_asset_qty(mut self, asset_qty: Decimal) -> Self {
        self.asset_qty = Some(asset_qty);
        self.recomputed()
    }

    /// Sets the item promotions.
    #[must_use]
    pub fn with_promotions(mut self, promotions: impl Into<Vec<Promotion>>) -> Self {
        self.promotions = promotions.into();
        self.recomputed()
    }

    /// Sets the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Recomputes the subtotal and discount.
    pub fn recompute(&mut self) {
        self.subtotal = line_subtotal(self.price, self.qty, self.asset_qty);
        self.update_discount();
    }

    /// Recomputes the derived fields, by value.
    #[must_use]
    pub fn recomputed(mut self) -> Self {
        self.recompute();
        self
    }

    /// Recomputes the discount from the item promotions.
    pub fn update_discount(&mut self) {
        self.discount = crate::promotions::total_amount(&self.promotions);
    }

    /// Drops every pricing adjustment ahead of an external recalculation.
    pub fn reset(&mut self) {
        self.discount = Decimal::ZERO;
        self.current_price = None;
        self.promotions.clear();
    }

    /// Title to display, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Amount payable for this line.
    pub fn amount(&self) -> Decimal {
        self.subtotal - self.discount
    }
}

/// What an item creator supplies when a cart creates a missing item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    /// Catalog name
    pub name: String,

    /// Display title
    pub title: Option<String>,

    /// Unit price, used when no price is cached for the item
    pub price: Decimal,

    /// Quantity for creators driven by asset quantity; defaults to one
    pub qty: Option<Decimal>,

    /// Item promotions
    pub promotions: Vec<Promotion>,

    /// Caller-defined fields
    pub extra: Map<String, Value>,
}

impl ItemDraft {
    /// Creates a draft with a name and a price.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_item_has_derived_fields() {
        let item = CartItem::new(1, "Widget", Decimal::from(10), Decimal::from(2));

        assert_eq!(item.subtotal, Decimal::from(20));
        assert_eq!(item.discount, Decimal::ZERO);
    }

    #[test]
    fn asset_qty_multiplies_subtotal() {
        let item = CartItem::new(1, "Seat", Decimal::from(10), Decimal::from(2))
            .with_asset_qty(Decimal::from(3));

        assert_eq!(item.subtotal, Decimal::from(60));
    }

    #[test]
    fn reset_clears_adjustments() {
        let mut item = CartItem::new(1, "Widget", Decimal::from(10), Decimal::ONE)
            .with_promotions([Promotion::new(1, "Sale", Decimal::from(2))]);
        item.current_price = Some(Decimal::from(8));

        item.reset();

        assert_eq!(item.discount, Decimal::ZERO);
        assert_eq!(item.current_price, None);
        assert!(item.promotions.is_empty());
    }

    #[test]
    fn update_discount_sums_promotions() {
        let mut item = CartItem::new(1, "Widget", Decimal::from(10), Decimal::ONE);
        item.promotions.push(Promotion::new(1, "A", Decimal::ONE));
        item.promotions.push(Promotion::new(2, "B", Decimal::new(25, 1)));

        item.update_discount();

        assert_eq!(item.discount, Decimal::new(35, 1));
        assert_eq!(item.amount(), Decimal::new(65, 1));
    }

    #[test]
    fn display_title_falls_back_to_name() {
        let item = CartItem::new(1, "Widget", Decimal::ONE, Decimal::ONE);

        assert_eq!(item.display_title(), "Widget");
        assert_eq!(item.with_title("Blue widget").display_title(), "Blue widget");
    }

    #[test]
    fn extra_fields_survive_serialization() -> TestResult {
        let json = r#"{"id":1,"name":"Widget","price":"10","qty":"2","sku":"W-1"}"#;

        let item: CartItem = serde_json::from_str(json)?;

        assert_eq!(item.extra.get("sku"), Some(&Value::from("W-1")));
        assert_eq!(serde_json::to_value(&item)?.get("sku"), Some(&Value::from("W-1")));

        Ok(())
    }
}
