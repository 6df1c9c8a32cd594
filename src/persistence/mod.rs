//! Key-value persistence with versioned JSON envelopes
//!
//! Storage is an external collaborator: every failure degrades to "empty"
//! on read and to a logged warning on write. Gameplay never depends on it.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Current envelope format version
pub const ENVELOPE_VERSION: u32 = 1;

/// A flat string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Versioned wrapper around every persisted blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            data,
        }
    }
}

/// Decode an enveloped blob, rejecting unknown versions
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(json).context("malformed envelope")?;
    if envelope.version != ENVELOPE_VERSION {
        bail!("unsupported envelope version {}", envelope.version);
    }
    Ok(envelope.data)
}

/// Encode a value inside the current envelope
pub fn encode<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(&Envelope::new(data)).context("failed to serialize envelope")
}

/// Read `key`, falling back to `T::default()` on any failure
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("Storage unavailable reading '{}': {:#}", key, e);
            return T::default();
        }
    };
    match decode(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Discarding stored '{}': {:#}", key, e);
            T::default()
        }
    }
}

/// Write `value` under `key`; failures are logged and swallowed
pub fn save_best_effort<T, S>(store: &S, key: &str, value: &T) -> bool
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let result = encode(value).and_then(|json| store.set(key, &json));
    if let Err(e) = &result {
        log::warn!("Could not save '{}': {:#}", key, e);
    }
    result.is_ok()
}

/// In-memory store for tests and the native runner
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
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// A store that is never available (private browsing, storage disabled)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        bail!("storage unavailable")
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        bail!("storage unavailable")
    }

    fn remove(&self, _key: &str) -> Result<()> {
        bail!("storage unavailable")
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn open() -> Result<Self> {
        let window = web_sys::window().context("no window")?;
        let storage = window
            .local_storage()
            .map_err(|e| anyhow::anyhow!("localStorage blocked: {:?}", e))?
            .context("localStorage missing")?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| anyhow::anyhow!("getItem failed: {:?}", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| anyhow::anyhow!("setItem failed: {:?}", e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| anyhow::anyhow!("removeItem failed: {:?}", e))
    }
}
