//! Prices

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::ids::EntityId;

/// Last known unit price per item id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCache {
    prices: FxHashMap<EntityId, Decimal>,
}

impl PriceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `price` for `id`, keeping an existing entry unless `override_existing` is set.
    ///
    /// Returns the price now cached for `id`.
    pub fn cache(&mut self, id: EntityId, price: Decimal, override_existing: bool) -> Decimal {
        if override_existing {
            self.prices.insert(id, price);
            return price;
        }

        *self.prices.entry(id).or_insert(price)
    }

    /// Returns the cached price for `id`.
    pub fn get(&self, id: &EntityId) -> Option<Decimal> {
        self.prices.get(id).copied()
    }

    /// Number of cached prices.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Drops every cached price.
    pub fn clear(&mut self) {
        self.prices.clear();
    }
}
