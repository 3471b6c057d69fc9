//! Cart
//!
//! Client-side shopping cart: priced line items, item and order-level
//! promotions, and persistence scoped to an owner, a currency and a culture.

pub mod cart;
pub mod config;
pub mod ids;
pub mod items;
pub mod keys;
pub mod owners;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod promotions;
pub mod storage;
