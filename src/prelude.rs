//! Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartSnapshot, ChangeHandler, ChangeReason},
    config::{CartConfig, ConfigError},
    ids::EntityId,
    items::{CartItem, ItemDraft},
    keys::{clear_with, create_key},
    owners::CartOwner,
    prices::PriceCache,
    promotions::Promotion,
    storage::{MemoryStorage, Slot, Storage, StorageError, StorageExt},
};
