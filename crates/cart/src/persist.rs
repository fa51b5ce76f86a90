//! The persistence slot.
//!
//! A single named blob holds the JSON-serialized cart: read once when the
//! store opens, overwritten wholesale after every successful mutation.
//! There is no versioning and no conflict detection on the slot; the last
//! writer wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::types::LineItem;

/// Errors that can occur reading or writing the persistence slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blob could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable key-value slot holding the serialized cart across sessions.
///
/// Both methods are synchronous: the slot is local storage, not a network
/// collaborator, and writes happen inline on the success path of each
/// mutation.
pub trait CartStorage: Send + Sync {
    /// Read the slot. `None` means the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read or parsed.
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError>;

    /// Overwrite the slot with the given cart state.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be serialized or written.
    fn save(&self, items: &[LineItem]) -> Result<(), StorageError>;
}

/// File-backed slot: one JSON file named after the slot key.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create a slot at `{dir}/{slot}.json`.
    ///
    /// Nothing is touched on disk until the first `save`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, slot: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{slot}.json")),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let blob = serde_json::to_string(items)?;
        fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// In-memory slot for tests and embedders that do not want disk state.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<Vec<LineItem>>>,
}

impl MemoryStorage {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot pre-seeded with cart state, as if a previous session
    /// had written it.
    #[must_use]
    pub fn with_items(items: Vec<LineItem>) -> Self {
        Self {
            slot: Mutex::new(Some(items)),
        }
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<LineItem>>, StorageError> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(items.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::types::ProductId;

    fn item(id: i64, quantity: u32) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: dec!(10.00),
            image: format!("https://cdn.example.com/{id}.jpg"),
            quantity,
        }
    }

    fn test_dir() -> PathBuf {
        std::env::temp_dir().join(format!("cartwheel-persist-{}", std::process::id()))
    }

    #[test]
    fn test_memory_storage_starts_empty() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        let items = vec![item(1, 2), item(2, 1)];
        storage.save(&items).unwrap();
        assert_eq!(storage.load().unwrap(), Some(items));
    }

    #[test]
    fn test_json_file_storage_missing_slot_is_none() {
        let storage = JsonFileStorage::new(test_dir(), "never-written");
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_json_file_storage_round_trip() {
        let storage = JsonFileStorage::new(test_dir(), "round-trip");
        let items = vec![item(3, 1)];
        storage.save(&items).unwrap();
        assert_eq!(storage.load().unwrap(), Some(items));
        let _ = fs::remove_file(storage.path());
    }

    #[test]
    fn test_json_file_storage_overwrites_wholesale() {
        let storage = JsonFileStorage::new(test_dir(), "overwrite");
        storage.save(&[item(1, 1), item(2, 2)]).unwrap();
        storage.save(&[item(2, 2)]).unwrap();
        assert_eq!(storage.load().unwrap(), Some(vec![item(2, 2)]));
        let _ = fs::remove_file(storage.path());
    }

    #[test]
    fn test_json_file_storage_corrupt_blob_is_error() {
        let dir = test_dir();
        let storage = JsonFileStorage::new(&dir, "corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(storage.path(), "{not json").unwrap();
        assert!(matches!(storage.load(), Err(StorageError::Serde(_))));
        let _ = fs::remove_file(storage.path());
    }
}
