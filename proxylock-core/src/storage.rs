//! Durable Key-Value Storage Abstraction
//!
//! Platform crates implement this trait on top of their storage backend
//! (a JSON file on desktop, NVS or AsyncStorage-like stores elsewhere).

use std::collections::HashMap;
use std::convert::Infallible;

/// Trait for a string-keyed, string-valued durable store
///
/// Each call must be atomic from the caller's view: a reader sees either the
/// old or the new value of a key, never a partial write.
pub trait KeyValueStore {
    /// Error type for storage operations
    type Error: std::fmt::Display;

    /// Get the value for `key`, `None` if never set
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Overwrite the value for `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// Non-durable in-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.values.remove(key);
        Ok(())
    }
}
