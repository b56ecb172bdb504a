//! Storage backends for profile and preference files
//!
//! Profiles are flat `id -> value` maps; JSON is the default format and TOML
//! is available behind the `toml` feature.

use crate::error::{Error, Result, read_file, write_file_atomic};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// Trait for storage backend implementations
pub trait StorageBackend: Clone + Send + Sync {
    /// File extension for this storage format (e.g., "json", "toml")
    fn extension(&self) -> &str;

    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize from file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let bytes = read_file(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))?;
        self.deserialize(&content)
    }

    /// Serialize and write to file (temp file + rename)
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;
        write_file_atomic(path, content)
    }
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// JSON storage backend (default)
#[derive(Clone, Debug)]
pub struct JsonStorage {
    pretty: bool,
}

impl JsonStorage {
    /// Create a new JSON storage backend with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON storage (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for JsonStorage {
    fn extension(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        serde_json::from_str(content).map_err(Error::from)
    }
}

// =============================================================================
// TOML Storage Implementation
// =============================================================================

/// TOML storage backend
#[cfg(feature = "toml")]
#[derive(Clone, Debug, Default)]
pub struct TomlStorage;

#[cfg(feature = "toml")]
impl TomlStorage {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "toml")]
impl StorageBackend for TomlStorage {
    fn extension(&self) -> &str {
        "toml"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        toml::to_string_pretty(data).map_err(|e| Error::Parse(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_json_serialize_pretty_and_compact() {
        let mut data = BTreeMap::new();
        data.insert("show_ext", 0);

        let pretty = JsonStorage::new().serialize(&data).unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("\"show_ext\": 0"));

        let compact = JsonStorage::compact().serialize(&data).unwrap();
        assert_eq!(compact, r#"{"show_ext":0}"#);
    }

    #[test]
    fn test_json_write_then_read() {
        let storage = JsonStorage::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles/work.json");

        let mut data = BTreeMap::new();
        data.insert("menu_delay".to_string(), "200".to_string());

        storage.write(&path, &data).unwrap();
        let loaded: BTreeMap<String, String> = storage.read(&path).unwrap();

        assert_eq!(data, loaded);
    }

    #[test]
    fn test_read_nonexistent_file() {
        let storage = JsonStorage::new();
        let result: Result<BTreeMap<String, i64>> =
            storage.read(Path::new("/nonexistent/profile.json"));

        assert!(matches!(result.unwrap_err(), Error::FileRead { .. }));
    }
}
