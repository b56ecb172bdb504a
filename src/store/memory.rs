//! In-process key/value store
//!
//! Key paths and value names are matched case-insensitively, like the
//! registry. Clones share the same underlying namespace, so a test can keep a
//! handle and simulate "another tool" changing values behind the engine.

use super::{KeyValueStore, Location, RegData, RegistryRoot, RegistryView};
use crate::config::{RawValue, ValueEncoding};
use crate::error::{Error, Result};
use crate::sync::RwLockExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

type Key = (RegistryRoot, RegistryView, String, String);

fn key_of(location: &Location) -> Key {
    (
        location.root,
        location.view,
        location.path.to_ascii_lowercase(),
        location.name.to_ascii_lowercase(),
    )
}

#[derive(Default)]
struct Inner {
    values: RwLock<HashMap<Key, RegData>>,
    failing_reads: RwLock<HashSet<Key>>,
    failing_writes: RwLock<HashSet<Key>>,
    failing_checkpoints: AtomicBool,
    writes: AtomicUsize,
    /// Description and write count at the time of each restore point
    checkpoints: RwLock<Vec<(String, usize)>>,
}

/// Thread-safe in-memory [`KeyValueStore`]
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value directly, bypassing encoding (simulates an external tool)
    pub fn insert(&self, location: Location, data: RegData) {
        if let Ok(mut values) = self.inner.values.write_recovered() {
            values.insert(key_of(&location), data);
        }
    }

    /// Current stored data at a location
    pub fn get(&self, location: &Location) -> Option<RegData> {
        self.inner
            .values
            .read_recovered()
            .ok()
            .and_then(|values| values.get(&key_of(location)).cloned())
    }

    /// Delete a value
    pub fn remove(&self, location: &Location) -> Option<RegData> {
        self.inner
            .values
            .write_recovered()
            .ok()
            .and_then(|mut values| values.remove(&key_of(location)))
    }

    /// Make every subsequent read of `location` fail with `StoreRead`
    pub fn fail_reads_at(&self, location: &Location) {
        if let Ok(mut set) = self.inner.failing_reads.write_recovered() {
            set.insert(key_of(location));
        }
    }

    /// Make every subsequent write to `location` fail with `StoreWrite`
    pub fn fail_writes_at(&self, location: &Location) {
        if let Ok(mut set) = self.inner.failing_writes.write_recovered() {
            set.insert(key_of(location));
        }
    }

    /// Make every subsequent restore point fail with `Checkpoint`
    pub fn fail_checkpoints(&self) {
        self.inner.failing_checkpoints.store(true, Ordering::SeqCst);
    }

    /// Restore points created so far, each with the number of writes that
    /// preceded it
    pub fn checkpoints(&self) -> Vec<(String, usize)> {
        self.inner
            .checkpoints
            .read_recovered()
            .map(|c| c.to_vec())
            .unwrap_or_default()
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.inner.failing_checkpoints.store(false, Ordering::SeqCst);
        if let Ok(mut set) = self.inner.failing_reads.write_recovered() {
            set.clear();
        }
        if let Ok(mut set) = self.inner.failing_writes.write_recovered() {
            set.clear();
        }
    }

    /// Number of successful writes performed through [`KeyValueStore::write`]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.inner.values.read_recovered().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, location: &Location) -> Result<Option<RegData>> {
        let key = key_of(location);
        if self.inner.failing_reads.read_recovered()?.contains(&key) {
            return Err(Error::StoreRead {
                location: location.to_string(),
                reason: "access denied".into(),
            });
        }
        Ok(self.inner.values.read_recovered()?.get(&key).cloned())
    }

    fn write(&self, location: &Location, value: &RawValue, encoding: ValueEncoding) -> Result<()> {
        let key = key_of(location);
        if self.inner.failing_writes.read_recovered()?.contains(&key) {
            return Err(Error::StoreWrite {
                location: location.to_string(),
                reason: "access denied".into(),
            });
        }
        let data = RegData::encode(location, value, encoding)?;
        self.inner.values.write_recovered()?.insert(key, data);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn checkpoint(&self, description: &str) -> Result<()> {
        if self.inner.failing_checkpoints.load(Ordering::SeqCst) {
            return Err(Error::Checkpoint("restore points are disabled".into()));
        }
        let writes = self.write_count();
        self.inner
            .checkpoints
            .write_recovered()?
            .push((description.to_string(), writes));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str) -> Location {
        Location::parse(r"HKCU\Software\Test", name).unwrap()
    }

    #[test]
    fn test_missing_value_is_not_an_error() {
        let store = MemoryStore::new();
        assert!(store.read(&loc("Missing")).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_and_read_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .write(&loc("Hidden"), &RawValue::Integer(1), ValueEncoding::Dword)
            .unwrap();

        let upper = Location::parse(r"HKCU\SOFTWARE\TEST", "HIDDEN").unwrap();
        assert_eq!(store.read(&upper).unwrap(), Some(RegData::Dword(1)));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_views_are_separate_namespaces() {
        let store = MemoryStore::new();
        store.insert(loc("Value"), RegData::Dword(1));

        assert!(store.read(&loc("Value").wow64_32()).unwrap().is_none());
    }

    #[test]
    fn test_injected_failures() {
        let store = MemoryStore::new();
        store.fail_writes_at(&loc("Locked"));
        store.fail_reads_at(&loc("Locked"));

        let write = store.write(&loc("Locked"), &RawValue::Integer(1), ValueEncoding::Dword);
        assert!(matches!(write, Err(Error::StoreWrite { .. })));
        assert!(matches!(
            store.read(&loc("Locked")),
            Err(Error::StoreRead { .. })
        ));

        store.clear_failures();
        assert!(store.read(&loc("Locked")).unwrap().is_none());
    }

    #[test]
    fn test_checkpoints_are_recorded() {
        let store = MemoryStore::new();
        store.checkpoint("first").unwrap();
        store
            .write(&loc("Value"), &RawValue::Integer(1), ValueEncoding::Dword)
            .unwrap();
        store.checkpoint("second").unwrap();

        assert_eq!(
            store.checkpoints(),
            vec![("first".to_string(), 0), ("second".to_string(), 1)]
        );

        store.fail_checkpoints();
        assert!(matches!(store.checkpoint("third"), Err(Error::Checkpoint(_))));
        assert_eq!(store.checkpoints().len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.insert(loc("Shared"), RegData::Text("x".into()));

        assert_eq!(store.get(&loc("Shared")), Some(RegData::Text("x".into())));
        assert_eq!(store.len(), 1);
    }
}
