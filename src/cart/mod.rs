//! Cart
//!
//! An in-memory list of priced items and order-level promotions, scoped to
//! a currency, a culture and optionally an owner. Derived item fields are
//! recomputed on every mutation and each successful mutation is reported to
//! the subscribed [`ChangeHandler`].
//!
//! Storage failures never surface from cart operations: they are logged and
//! the in-memory state stays authoritative.

use std::{fmt, slice};

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::CartConfig,
    ids::EntityId,
    items::{CartItem, ItemDraft},
    keys,
    owners::CartOwner,
    prices::PriceCache,
    pricing,
    promotions::Promotion,
    storage::{Slot, Storage, StorageExt},
};

pub mod changes;
pub mod snapshot;

use changes::emit;
pub use changes::{ChangeHandler, ChangeReason};
pub use snapshot::CartSnapshot;

/// Shopping cart
pub struct Cart<S: Storage> {
    currency: String,
    culture: String,
    owner: Option<CartOwner>,
    items: Vec<CartItem>,
    promotions: Vec<Promotion>,
    form_data: Option<Value>,
    prices: PriceCache,
    storage: S,
    config: CartConfig,
    on_change: Option<ChangeHandler>,
}

impl<S: Storage + fmt::Debug> fmt::Debug for Cart<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("currency", &self.currency)
            .field("culture", &self.culture)
            .field("owner", &self.owner)
            .field("items", &self.items)
            .field("promotions", &self.promotions)
            .field("form_data", &self.form_data)
            .field("prices", &self.prices)
            .field("storage", &self.storage)
            .field("config", &self.config)
            .field("subscribed", &self.on_change.is_some())
            .finish()
    }
}

impl<S: Storage> Cart<S> {
    /// Creates an empty, owner-less cart.
    pub fn new(currency: impl Into<String>, culture: impl Into<String>, storage: S) -> Self {
        Self::from_snapshot(CartSnapshot::new(currency, culture), storage)
    }

    /// Creates a cart hydrated from a snapshot.
    ///
    /// Derived item fields are recomputed and item prices seed the price cache.
    pub fn from_snapshot(snapshot: CartSnapshot, storage: S) -> Self {
        let CartSnapshot {
            currency,
            culture,
            owner,
            items,
            promotions,
            form_data,
        } = snapshot;

        let mut cart = Self {
            currency,
            culture,
            owner,
            items: Vec::new(),
            promotions: Vec::new(),
            form_data: None,
            prices: PriceCache::new(),
            storage,
            config: CartConfig::default(),
            on_change: None,
        };

        cart.hydrate(items, promotions, form_data);

        cart
    }

    /// Uses `config` for identifiers and the cart index.
    #[must_use]
    pub fn with_config(mut self, config: CartConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribes `handler` to changes, replacing any previous subscriber.
    pub fn subscribe(&mut self, handler: impl FnMut(ChangeReason, &[CartItem]) + 'static) {
        self.on_change = Some(Box::new(handler));
    }

    /// Removes the change subscriber.
    pub fn unsubscribe(&mut self) {
        self.on_change = None;
    }

    /// ISO currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Culture.
    pub fn culture(&self) -> &str {
        &self.culture
    }

    /// Owner, if assigned.
    pub fn owner(&self) -> Option<&CartOwner> {
        self.owner.as_ref()
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Order-level promotions.
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Checkout form state.
    pub fn form_data(&self) -> Option<&Value> {
        self.form_data.as_ref()
    }

    /// Replaces the checkout form state.
    pub fn set_form_data(&mut self, form_data: Option<Value>) {
        self.form_data = form_data;
    }

    /// Storage adapter.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Storage identifier for the current currency, culture and owner.
    pub fn identifier(&self) -> String {
        self.config.identifier(&self.currency, &self.culture, self.owner.as_ref())
    }

    /// Number of lines.
    pub fn lines(&self) -> usize {
        self.items.len()
    }

    /// Sum of item quantities.
    pub fn total_qty(&self) -> Decimal {
        self.items.iter().map(|item| item.qty).sum()
    }

    /// Item subtotals less item discounts, less order-level promotions.
    pub fn total_amount(&self) -> Decimal {
        pricing::total_amount(&self.items, &self.promotions)
    }

    /// [`Cart::total_amount`] formatted in the cart currency.
    pub fn total_amount_str(&self) -> String {
        pricing::format_money(self.total_amount(), &self.currency)
    }

    /// Symbol of the cart currency.
    pub fn symbol(&self) -> Option<&'static str> {
        pricing::currency_symbol(&self.currency)
    }

    /// Item with the given id.
    pub fn get_item(&self, id: impl Into<EntityId>) -> Option<&CartItem> {
        let id = id.into();

        self.items.iter().find(|item| item.id == id)
    }

    /// Cached unit price for the given id.
    pub fn cached_price(&self, id: impl Into<EntityId>) -> Option<Decimal> {
        let id = id.into();

        self.prices.get(&id)
    }

    /// Caches a unit price, keeping an existing entry unless `override_existing` is set.
    ///
    /// Returns the price now cached.
    pub fn cache_price(
        &mut self,
        id: impl Into<EntityId>,
        price: Decimal,
        override_existing: bool,
    ) -> Decimal {
        self.prices.cache(id.into(), price, override_existing)
    }

    /// Identifiers of every persisted cart known to the storage.
    pub fn key_sources(&self) -> Vec<String> {
        keys::known_keys(&self.storage, &self.config.sources_key)
    }

    /// Assigns the owner.
    ///
    /// Assigning the owner already set is a no-op. Any other owner replaces the
    /// current one and the cart is hydrated from a snapshot stored under the
    /// new identifier, if there is one. `None` drops the owner without loading.
    ///
    /// Returns whether a snapshot was loaded.
    pub fn set_owner(&mut self, owner: Option<CartOwner>) -> bool {
        let Some(owner) = owner else {
            self.owner = None;
            return false;
        };

        if self.owner.as_ref().is_some_and(|current| current.is_same(&owner)) {
            return false;
        }

        self.owner = Some(owner);

        self.load()
    }

    /// Hydrates the cart from the snapshot stored under the current identifier.
    ///
    /// The persisted slot is preferred over the transient one. Returns whether
    /// a snapshot was found.
    pub fn load(&mut self) -> bool {
        let identifier = self.identifier();

        let Some(snapshot) = self.read_snapshot(&identifier) else {
            return false;
        };

        self.prices.clear();
        self.hydrate(snapshot.items, snapshot.promotions, snapshot.form_data);

        debug!(%identifier, lines = self.items.len(), "loaded cart");

        emit(self.on_change.as_mut(), ChangeReason::Update, &self.items);

        true
    }

    /// Builds a snapshot of the current state.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            currency: self.currency.clone(),
            culture: self.culture.clone(),
            owner: self.owner.clone(),
            items: self.items.clone(),
            promotions: self.promotions.clone(),
            form_data: self.form_data.clone(),
        }
    }

    /// Writes a snapshot under the current identifier.
    ///
    /// Nothing is written without an owner. A persisted write also registers
    /// the identifier in the cart index. Returns the snapshot when an owner is
    /// set, whether or not the write succeeded.
    pub fn save(&self, persisted: bool) -> Option<CartSnapshot> {
        self.owner.as_ref()?;

        let identifier = self.identifier();
        let snapshot = self.snapshot();
        let slot = if persisted {
            Slot::Persisted
        } else {
            Slot::Transient
        };

        match self.storage.write(slot, &identifier, Some(&snapshot)) {
            Ok(()) => {
                if persisted {
                    keys::register_key(&self.storage, &self.config.sources_key, &identifier);
                }

                debug!(%identifier, lines = snapshot.items.len(), persisted, "saved cart");
            }
            Err(error) => warn!(%identifier, %error, "failed to save cart"),
        }

        Some(snapshot)
    }

    /// Appends an item without checking for duplicate ids.
    pub fn add_item(&mut self, item: CartItem) {
        self.add_items([item]);
    }

    /// Appends items without checking for duplicate ids.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = CartItem>) {
        let start = self.items.len();

        self.items.extend(items.into_iter().map(CartItem::recomputed));

        let added = self.items.get(start..).unwrap_or_default();

        emit(self.on_change.as_mut(), ChangeReason::Add, added);
    }

    /// Appends an item unless one with the same id exists.
    ///
    /// Returns whether the item was added.
    pub fn push_item(&mut self, item: CartItem) -> bool {
        if self.position(&item.id).is_some() {
            return false;
        }

        self.add_item(item);

        true
    }

    /// Sets the quantity of an item, removing it when `qty` is `None`.
    ///
    /// A missing item is left missing; use [`Cart::update_item_with`] to
    /// create it. Returns whether the cart changed.
    pub fn update_item(&mut self, id: impl Into<EntityId>, qty: Option<Decimal>) -> bool {
        self.upsert_qty(id.into(), qty, None::<fn() -> ItemDraft>)
    }

    /// Sets the quantity of an item, creating it from `creator` when missing.
    ///
    /// A new item takes the cached price for its id, falling back to the
    /// draft price. Returns whether the cart changed.
    pub fn update_item_with<F>(
        &mut self,
        id: impl Into<EntityId>,
        qty: Option<Decimal>,
        creator: F,
    ) -> bool
    where
        F: FnOnce() -> ItemDraft,
    {
        self.upsert_qty(id.into(), qty, Some(creator))
    }

    /// Sets the asset quantity of an item; non-positive or missing values count as one.
    ///
    /// Updating an existing item drops its promotions. Returns whether the
    /// cart changed.
    pub fn update_asset_item(
        &mut self,
        id: impl Into<EntityId>,
        asset_qty: Option<Decimal>,
    ) -> bool {
        self.upsert_asset_qty(id.into(), asset_qty, None::<fn() -> ItemDraft>)
    }

    /// Sets the asset quantity of an item, creating it from `creator` when missing.
    ///
    /// Returns whether the cart changed.
    pub fn update_asset_item_with<F>(
        &mut self,
        id: impl Into<EntityId>,
        asset_qty: Option<Decimal>,
        creator: F,
    ) -> bool
    where
        F: FnOnce() -> ItemDraft,
    {
        self.upsert_asset_qty(id.into(), asset_qty, Some(creator))
    }

    /// Sets the unit price for an id, overriding the cached price.
    ///
    /// The price is cached even when no item has the id yet. Returns whether
    /// an item was repriced.
    pub fn update_price(&mut self, id: impl Into<EntityId>, price: Decimal) -> bool {
        let id = id.into();

        self.prices.cache(id.clone(), price, true);

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        item.price = price;
        item.recompute();

        emit(self.on_change.as_mut(), ChangeReason::Update, slice::from_ref(item));

        true
    }

    /// Sets the display title of an item; a title equal to the name is dropped.
    ///
    /// Returns whether the item exists.
    pub fn update_title(&mut self, id: impl Into<EntityId>, title: impl Into<String>) -> bool {
        let id = id.into();
        let title = title.into();

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        item.title = (title != item.name).then_some(title);

        emit(self.on_change.as_mut(), ChangeReason::Title, slice::from_ref(item));

        true
    }

    /// Removes the item at `index`, returning it when in range.
    pub fn remove_item(&mut self, index: usize) -> Option<CartItem> {
        if index >= self.items.len() {
            return None;
        }

        let removed = self.items.remove(index);

        emit(self.on_change.as_mut(), ChangeReason::Remove, slice::from_ref(&removed));

        Some(removed)
    }

    /// Removes the item with the given id, returning it when present.
    pub fn remove_item_by_id(&mut self, id: impl Into<EntityId>) -> Option<CartItem> {
        let id = id.into();
        let index = self.position(&id)?;

        self.remove_item(index)
    }

    /// Drops the discount, current price and promotions of an item.
    ///
    /// Returns whether the item exists.
    pub fn reset_item(&mut self, id: impl Into<EntityId>) -> bool {
        let id = id.into();

        self.modify_item(&id, CartItem::reset)
    }

    /// Recomputes the discount of an item from its promotions.
    ///
    /// Returns whether the item exists.
    pub fn update_discount(&mut self, id: impl Into<EntityId>) -> bool {
        let id = id.into();

        self.modify_item(&id, CartItem::update_discount)
    }

    /// Replaces the promotions of an item and recomputes its discount.
    ///
    /// Returns whether the item exists.
    pub fn set_item_promotions(
        &mut self,
        id: impl Into<EntityId>,
        promotions: Vec<Promotion>,
    ) -> bool {
        let id = id.into();

        self.modify_item(&id, |item| {
            item.promotions = promotions;
            item.update_discount();
        })
    }

    /// Replaces the order-level promotions.
    pub fn set_promotions(&mut self, promotions: Vec<Promotion>) {
        self.promotions = promotions;

        emit(self.on_change.as_mut(), ChangeReason::Update, &[]);
    }

    /// Empties items, promotions, form data and the price cache.
    ///
    /// With `keep_owner` the empty cart is persisted under the same
    /// identifier. Otherwise both storage slots are removed, the identifier is
    /// dropped from the cart index and the owner is unset.
    pub fn clear(&mut self, keep_owner: bool) {
        self.items.clear();
        self.promotions.clear();
        self.prices.clear();
        self.form_data = None;

        if keep_owner {
            self.save(true);
        } else {
            let identifier = self.identifier();

            keys::clear(&identifier, &self.storage);
            keys::unregister_key(&self.storage, &self.config.sources_key, &identifier);

            self.owner = None;
        }

        emit(self.on_change.as_mut(), ChangeReason::Clear, &[]);
    }

    /// Clears the cart keeping the owner, then switches currency and culture.
    pub fn reset(&mut self, currency: impl Into<String>, culture: impl Into<String>) {
        self.clear(true);

        self.currency = currency.into();
        self.culture = culture.into();
    }

    fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id == *id)
    }

    fn hydrate(
        &mut self,
        items: Vec<CartItem>,
        promotions: Vec<Promotion>,
        form_data: Option<Value>,
    ) {
        self.items = items.into_iter().map(CartItem::recomputed).collect();
        self.promotions = promotions;
        self.form_data = form_data;

        for item in &self.items {
            self.prices.cache(item.id.clone(), item.price, false);
        }
    }

    fn read_snapshot(&self, identifier: &str) -> Option<CartSnapshot> {
        for slot in [Slot::Persisted, Slot::Transient] {
            match self.storage.read::<CartSnapshot>(slot, identifier) {
                Ok(Some(snapshot)) => return Some(snapshot),
                Ok(None) => {}
                Err(error) => warn!(identifier, ?slot, %error, "failed to read cart"),
            }
        }

        None
    }

    fn modify_item(&mut self, id: &EntityId, modify: impl FnOnce(&mut CartItem)) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == *id) else {
            return false;
        };

        modify(item);

        emit(self.on_change.as_mut(), ChangeReason::Update, slice::from_ref(item));

        true
    }

    fn upsert_qty<F>(&mut self, id: EntityId, qty: Option<Decimal>, creator: Option<F>) -> bool
    where
        F: FnOnce() -> ItemDraft,
    {
        let Some(qty) = qty else {
            return self.remove_item_by_id(id).is_some();
        };

        let cached = self.prices.get(&id);

        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.price = cached.unwrap_or(item.price);
            item.qty = qty;
            item.recompute();

            emit(self.on_change.as_mut(), ChangeReason::Update, slice::from_ref(item));

            return true;
        }

        let Some(creator) = creator else {
            return false;
        };

        let draft = creator();
        let price = self.prices.cache(id.clone(), draft.price, false);

        self.add_item(CartItem::from_draft(id, draft, price, qty));

        true
    }

    fn upsert_asset_qty<F>(
        &mut self,
        id: EntityId,
        asset_qty: Option<Decimal>,
        creator: Option<F>,
    ) -> bool
    where
        F: FnOnce() -> ItemDraft,
    {
        let asset_qty = asset_qty
            .filter(|asset_qty| *asset_qty > Decimal::ZERO)
            .unwrap_or(Decimal::ONE);

        let cached = self.prices.get(&id);

        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.price = cached.unwrap_or(item.price);
            item.asset_qty = Some(asset_qty);
            item.promotions.clear();
            item.recompute();

            emit(self.on_change.as_mut(), ChangeReason::Update, slice::from_ref(item));

            return true;
        }

        let Some(creator) = creator else {
            return false;
        };

        let draft = creator();
        let qty = draft.qty.unwrap_or(Decimal::ONE);
        let price = self.prices.cache(id.clone(), draft.price, false);

        self.add_item(CartItem::from_draft(id, draft, price, qty).with_asset_qty(asset_qty));

        true
    }
}
