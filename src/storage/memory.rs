//! In-memory storage

use std::sync::{Mutex, MutexGuard};

use rustc_hash::FxHashMap;
use serde_json::Value;

use super::{Storage, StorageError};

type Slots = FxHashMap<String, Value>;

/// Storage adapter keeping both slots in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    transient: Mutex<Slots>,
    persisted: Mutex<Slots>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every transient value, as a page reload would.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the transient lock is poisoned.
    pub fn end_session(&self) -> Result<(), StorageError> {
        lock(&self.transient)?.clear();

        Ok(())
    }

    /// Number of persisted keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the persisted lock is poisoned.
    pub fn persisted_len(&self) -> Result<usize, StorageError> {
        Ok(lock(&self.persisted)?.len())
    }
}

fn lock(slots: &Mutex<Slots>) -> Result<MutexGuard<'_, Slots>, StorageError> {
    slots.lock().map_err(|_poisoned| StorageError::Poisoned)
}

fn write(slots: &Mutex<Slots>, key: &str, value: Option<Value>) -> Result<(), StorageError> {
    let mut slots = lock(slots)?;

    match value {
        Some(value) => {
            slots.insert(key.to_string(), value);
        }
        None => {
            slots.remove(key);
        }
    }

    Ok(())
}

impl Storage for MemoryStorage {
    fn get_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(lock(&self.transient)?.get(key).cloned())
    }

    fn set_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        write(&self.transient, key, value)
    }

    fn get_persisted_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(lock(&self.persisted)?.get(key).cloned())
    }

    fn set_persisted_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        write(&self.persisted, key, value)
    }
}
