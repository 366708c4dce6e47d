//! Key/value persistence
//!
//! The leaderboard and settings are small JSON documents stored under fixed
//! keys. On the web the store is LocalStorage; natively (and in tests) an
//! in-memory map stands in for it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage failures. Callers log these and carry on with defaults.
#[derive(Debug)]
pub enum StorageError {
    /// No storage backend (private browsing, storage disabled)
    Unavailable,
    /// The backend refused a read or write (quota, security policy)
    Backend {
        key: String,
        message: String,
    },
    /// Stored text did not parse or a value failed to serialize
    Json {
        key: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage is unavailable"),
            StorageError::Backend { key, message } => {
                write!(f, "storage backend failed for '{}': {}", key, message)
            }
            StorageError::Json { key, source } => {
                write!(f, "invalid JSON under '{}': {}", key, source)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// String key/value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read and parse a JSON document; `Ok(None)` when the key is absent
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let text = serde_json::to_string(value).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &text)
}

/// In-memory store (native builds and tests)
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn open() -> Result<Self, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
fn js_message(value: wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                message: js_message(e),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                message: js_message(e),
            })
    }
}

/// Best available store for this platform
pub fn default_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        match LocalStore::open() {
            Ok(store) => return Box::new(store),
            Err(e) => log::warn!("{}; falling back to memory", e),
        }
    }
    Box::new(MemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<u32>> = load_json(&store, "nothing").expect("memory store");
        assert!(value.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let store = MemoryStore::new();
        save_json(&store, "k", &vec![3u32, 1, 2]).expect("save");
        let value: Option<Vec<u32>> = load_json(&store, "k").expect("load");
        assert_eq!(value, Some(vec![3, 1, 2]));
    }

    #[test]
    fn test_corrupt_json_reports_key() {
        let store = MemoryStore::new();
        store.set("k", "{ nope").expect("set");
        let err = load_json::<Vec<u32>>(&store, "k").unwrap_err();
        assert!(matches!(err, StorageError::Json { ref key, .. } if key == "k"));
        assert!(err.to_string().contains("'k'"));
    }
}
