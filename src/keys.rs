//! Cart keys
//!
//! Every cart lives under an identifier derived from its currency, culture
//! and owner. Identifiers of persisted carts are also recorded in an index
//! under a well-known key so they can be enumerated and wiped later.

use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::{Slot, Storage, StorageExt};

/// Prefix of every cart identifier.
pub const DEFAULT_KEY_PREFIX: &str = "CART";

/// Key of the index of persisted cart identifiers.
pub const DEFAULT_SOURCES_KEY: &str = "CART-SOURCES";

/// Suffix of an owner-less cart identifier.
pub const DEFAULT_SUFFIX: &str = "KEY";

/// Creates a cart identifier with the default prefix.
pub fn create_key(currency: &str, culture: &str, suffix: Option<&str>) -> String {
    compose_key(DEFAULT_KEY_PREFIX, currency, culture, suffix)
}

pub(crate) fn compose_key(
    prefix: &str,
    currency: &str,
    culture: &str,
    suffix: Option<&str>,
) -> String {
    let suffix = suffix.unwrap_or(DEFAULT_SUFFIX);

    format!("{prefix}-{culture}-{suffix}-{currency}")
}

/// Removes both slots of `identifier`.
///
/// Each slot is cleared independently; failures are logged and do not stop
/// the other slot from being cleared.
pub fn clear<S: Storage + ?Sized>(identifier: &str, storage: &S) {
    if let Err(error) = storage.set_data(identifier, None) {
        warn!(identifier, %error, "failed to clear transient cart");
    }

    if let Err(error) = storage.set_persisted_data(identifier, None) {
        warn!(identifier, %error, "failed to clear persisted cart");
    }

    debug!(identifier, "cleared cart storage");
}

/// Removes both slots of the owner-less cart for `currency` and `culture`.
pub fn clear_with<S: Storage + ?Sized>(currency: &str, culture: &str, storage: &S) {
    clear(&create_key(currency, culture, None), storage);
}

/// Reads the index of persisted cart identifiers.
///
/// An unreadable index is logged and treated as empty.
pub fn known_keys<S: Storage + ?Sized>(storage: &S, sources_key: &str) -> Vec<String> {
    let index = storage
        .get_persisted_data(sources_key, Value::Array(Vec::new()))
        .and_then(|value| serde_json::from_value(value).map_err(Into::into));

    match index {
        Ok(keys) => keys,
        Err(error) => {
            warn!(key = sources_key, %error, "failed to read cart index");
            Vec::new()
        }
    }
}

/// Adds `identifier` to the index, returning whether it was newly added.
pub fn register_key<S: Storage + ?Sized>(
    storage: &S,
    sources_key: &str,
    identifier: &str,
) -> bool {
    let mut keys = known_keys(storage, sources_key);

    if keys.iter().any(|key| key == identifier) {
        return false;
    }

    keys.push(identifier.to_string());

    write_index(storage, sources_key, &keys)
}

/// Removes `identifier` from the index, returning whether it was present.
pub fn unregister_key<S: Storage + ?Sized>(
    storage: &S,
    sources_key: &str,
    identifier: &str,
) -> bool {
    let mut keys = known_keys(storage, sources_key);
    let before = keys.len();

    keys.retain(|key| key != identifier);

    if keys.len() == before {
        return false;
    }

    write_index(storage, sources_key, &keys)
}

/// Clears every cart recorded in the index, then the index itself.
///
/// Returns the identifiers that were cleared.
pub fn clear_known<S: Storage + ?Sized>(storage: &S, sources_key: &str) -> Vec<String> {
    let keys = known_keys(storage, sources_key);

    for key in &keys {
        clear(key, storage);
    }

    if let Err(error) = storage.set_persisted_data(sources_key, None) {
        warn!(key = sources_key, %error, "failed to clear cart index");
    }

    keys
}

fn write_index<S: Storage + ?Sized>(storage: &S, sources_key: &str, keys: &[String]) -> bool {
    match storage.write(Slot::Persisted, sources_key, Some(&keys)) {
        Ok(()) => true,
        Err(error) => {
            warn!(key = sources_key, %error, "failed to write cart index");
            false
        }
    }
}
