//! Persisted user preferences
//!
//! Currently just the list of pinned (favorite) settings, kept in insertion
//! order and written through the configured [`StorageBackend`].

use crate::error::Result;
use crate::storage::StorageBackend;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable
    pub fn load<S: StorageBackend>(storage: &S, path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences at {}, using defaults", path.display());
            return Self::default();
        }
        match storage.read(path) {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!("Ignoring unreadable preferences {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// # Errors
    ///
    /// Returns serialization or file write errors.
    pub fn save<S: StorageBackend>(&self, storage: &S, path: &Path) -> Result<()> {
        storage.write(path, self)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    /// Pin or unpin `id`; returns whether it is now a favorite
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        if let Some(pos) = self.favorites.iter().position(|f| f == id) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(id.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonStorage;
    use tempfile::tempdir;

    #[test]
    fn test_toggle_favorite() {
        let mut prefs = Preferences::default();

        assert!(prefs.toggle_favorite("show_ext"));
        assert!(prefs.toggle_favorite("clock_seconds"));
        assert!(prefs.is_favorite("show_ext"));

        assert!(!prefs.toggle_favorite("show_ext"));
        assert_eq!(prefs.favorites, ["clock_seconds"]);
    }

    #[test]
    fn test_missing_or_corrupt_file_gives_defaults() {
        let storage = JsonStorage::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        assert_eq!(Preferences::load(&storage, &path), Preferences::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Preferences::load(&storage, &path), Preferences::default());
    }

    #[test]
    fn test_save_and_load() {
        let storage = JsonStorage::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let mut prefs = Preferences::default();
        prefs.toggle_favorite("menu_delay");
        prefs.save(&storage, &path).unwrap();

        assert_eq!(Preferences::load(&storage, &path), prefs);
    }
}
