//! Persisted key-value storage for launch tracking.
//!
//! A [`PreferenceStore`] is one namespace of JSON values keyed by string.
//! [`Preferences`] layers the three typed fields the tracker needs on top of
//! any store, applying their defaults when a key has never been written.
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `first_launch_date` | integer, epoch ms | `0` (unset) |
//! | `launch_count` | integer | `0` |
//! | `do_not_show_again` | boolean | `false` |

mod file;

pub use file::JsonFileStore;

use std::collections::BTreeMap;

use serde_json::Value;

pub const KEY_FIRST_LAUNCH_DATE: &str = "first_launch_date";
pub const KEY_LAUNCH_COUNT: &str = "launch_count";
pub const KEY_DO_NOT_SHOW_AGAIN: &str = "do_not_show_again";

/// Sentinel stored in `first_launch_date` until the first launch is seen.
pub const NOT_SET: i64 = 0;

/// A namespace of persisted values.
///
/// Errors from the backing storage are returned unchanged; this crate adds
/// no retry or recovery on top of them.
pub trait PreferenceStore {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<Value>, String>;

    /// Write a value, replacing any previous one.
    fn put(&mut self, key: &str, value: Value) -> Result<(), String>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Value>, String> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), String> {
        (**self).put(key, value)
    }
}

/// Volatile store for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, String> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), String> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Typed view of the launch-tracking keys.
pub struct Preferences<S> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn first_launch_date(&self) -> Result<i64, String> {
        match self.store.get(KEY_FIRST_LAUNCH_DATE)? {
            None => Ok(NOT_SET),
            Some(v) => v.as_i64().ok_or_else(|| type_error(KEY_FIRST_LAUNCH_DATE, "integer", &v)),
        }
    }

    pub fn set_first_launch_date(&mut self, millis: i64) -> Result<&mut Self, String> {
        self.store.put(KEY_FIRST_LAUNCH_DATE, Value::from(millis))?;
        Ok(self)
    }

    pub fn launch_count(&self) -> Result<u32, String> {
        match self.store.get(KEY_LAUNCH_COUNT)? {
            None => Ok(0),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| type_error(KEY_LAUNCH_COUNT, "non-negative 32-bit integer", &v)),
        }
    }

    pub fn set_launch_count(&mut self, count: u32) -> Result<&mut Self, String> {
        self.store.put(KEY_LAUNCH_COUNT, Value::from(count))?;
        Ok(self)
    }

    pub fn do_not_show_again(&self) -> Result<bool, String> {
        match self.store.get(KEY_DO_NOT_SHOW_AGAIN)? {
            None => Ok(false),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| type_error(KEY_DO_NOT_SHOW_AGAIN, "boolean", &v)),
        }
    }

    pub fn set_do_not_show_again(&mut self, enabled: bool) -> Result<&mut Self, String> {
        self.store.put(KEY_DO_NOT_SHOW_AGAIN, Value::from(enabled))?;
        Ok(self)
    }
}

fn type_error(key: &str, expected: &str, got: &Value) -> String {
    format!("invalid value for preference `{key}`: expected {expected}, got {got}")
}
