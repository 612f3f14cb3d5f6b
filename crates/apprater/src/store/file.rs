//! JSON-file backed [`PreferenceStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::PreferenceStore;

/// One namespace persisted as a JSON object in `<dir>/<namespace>.json`.
///
/// Nothing is held in memory between calls. Every [`get`](PreferenceStore::get)
/// reads the file, and every [`put`](PreferenceStore::put) re-reads it, merges
/// the one key, and rewrites the whole file atomically (temp file + rename).
/// Handles opened on the same file see each other's writes, and a failed
/// write leaves both the file and later reads unchanged.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the namespace under `dir`. A missing file is an empty namespace;
    /// an unreadable or malformed one is an error.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, String> {
        validate_namespace(namespace)?;
        let path = dir.as_ref().join(format!("{namespace}.json"));
        Self::open_path(path)
    }

    /// Open a store at an explicit file path.
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self, String> {
        let store = Self { path: path.into() };
        let values = store.load()?;
        debug!(path = %store.path.display(), keys = values.len(), "opened preference file");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>, String> {
        match std::fs::read(&self.path) {
            Ok(bytes) => parse_object(&self.path, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(format!(
                "failed to read preferences {}: {e}",
                self.path.display()
            )),
        }
    }

    fn write(&self, values: &BTreeMap<String, Value>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create dir {}: {e}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(values)
            .map_err(|e| format!("failed to serialize preferences: {e}"))?;

        let file_name = self
            .path
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("preferences");
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        std::fs::write(&tmp_path, json)
            .map_err(|e| format!("failed to write temp file {}: {e}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| format!("failed to finalize {}: {e}", self.path.display()))?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, String> {
        Ok(self.load()?.remove(key))
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), String> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value);
        self.write(&values)
    }
}

fn parse_object(path: &Path, bytes: &[u8]) -> Result<BTreeMap<String, Value>, String> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| format!("failed to parse preferences {}: {e}", path.display()))
}

fn validate_namespace(namespace: &str) -> Result<(), String> {
    let ok = !namespace.is_empty()
        && namespace != "."
        && namespace != ".."
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(format!("invalid preference namespace `{namespace}`"))
    }
}
