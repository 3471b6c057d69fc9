//! Storage
//!
//! Key-value adapter with a transient (session) and a persisted (durable)
//! slot per key, each holding one JSON value.

use std::{rc::Rc, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStorage;

/// Errors raised by storage adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A value could not be converted to or from JSON.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The adapter's internal lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The backing store reported a failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Which slot of a key to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Session-scoped value, lost on reload
    Transient,

    /// Durable value, survives reload
    Persisted,
}

/// Key-value store backing cart persistence.
///
/// Writing `None` removes the value.
pub trait Storage {
    /// Reads the transient value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    fn get_object(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Writes or removes the transient value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be written.
    fn set_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError>;

    /// Reads the persisted value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    fn get_persisted_object(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Writes or removes the persisted value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be written.
    fn set_persisted_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError>;

    /// Reads the persisted value under `key`, or `default` when it is missing.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    fn get_persisted_data(&self, key: &str, default: Value) -> Result<Value, StorageError> {
        Ok(self.get_persisted_object(key)?.unwrap_or(default))
    }
}

/// Typed access to a [`Storage`] slot.
pub trait StorageExt: Storage {
    /// Reads and deserializes the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the read fails or the value does not deserialize.
    fn read<T: DeserializeOwned>(&self, slot: Slot, key: &str) -> Result<Option<T>, StorageError> {
        let value = match slot {
            Slot::Transient => self.get_object(key)?,
            Slot::Persisted => self.get_persisted_object(key)?,
        };

        value
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    /// Serializes and writes `value` under `key`, removing it when `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value does not serialize or the write fails.
    fn write<T: Serialize>(
        &self,
        slot: Slot,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), StorageError> {
        let value = value.map(serde_json::to_value).transpose()?;

        match slot {
            Slot::Transient => self.set_data(key, value),
            Slot::Persisted => self.set_persisted_data(key, value),
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get_object(key)
    }

    fn set_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        (**self).set_data(key, value)
    }

    fn get_persisted_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get_persisted_object(key)
    }

    fn set_persisted_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        (**self).set_persisted_data(key, value)
    }
}

impl<S: Storage + ?Sized> Storage for Rc<S> {
    fn get_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get_object(key)
    }

    fn set_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        (**self).set_data(key, value)
    }

    fn get_persisted_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get_persisted_object(key)
    }

    fn set_persisted_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        (**self).set_persisted_data(key, value)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get_object(key)
    }

    fn set_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        (**self).set_data(key, value)
    }

    fn get_persisted_object(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get_persisted_object(key)
    }

    fn set_persisted_data(&self, key: &str, value: Option<Value>) -> Result<(), StorageError> {
        (**self).set_persisted_data(key, value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn typed_round_trip_through_slots() -> TestResult {
        let storage = MemoryStorage::new();

        storage.write(Slot::Persisted, "k", Some(&vec![1, 2, 3]))?;

        assert_eq!(
            storage.read::<Vec<i32>>(Slot::Persisted, "k")?,
            Some(vec![1, 2, 3])
        );
        assert_eq!(storage.read::<Vec<i32>>(Slot::Transient, "k")?, None);

        Ok(())
    }

    #[test]
    fn writing_none_removes_value() -> TestResult {
        let storage = MemoryStorage::new();
        storage.set_data("k", Some(json!("v")))?;

        storage.write::<String>(Slot::Transient, "k", None)?;

        assert_eq!(storage.get_object("k")?, None);

        Ok(())
    }

    #[test]
    fn read_with_wrong_shape_is_serialization_error() -> TestResult {
        let storage = MemoryStorage::new();
        storage.set_persisted_data("k", Some(json!({"not": "a list"})))?;

        let result = storage.read::<Vec<i32>>(Slot::Persisted, "k");

        assert!(matches!(result, Err(StorageError::Serialization(_))));

        Ok(())
    }

    #[test]
    fn get_persisted_data_falls_back_to_default() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get_persisted_data("missing", json!([]))?, json!([]));

        Ok(())
    }

    #[test]
    fn shared_handles_see_the_same_store() -> TestResult {
        let storage = Rc::new(MemoryStorage::new());
        let other = Rc::clone(&storage);

        other.set_persisted_data("k", Some(json!(1)))?;

        assert_eq!(storage.get_persisted_object("k")?, Some(json!(1)));

        Ok(())
    }
}
