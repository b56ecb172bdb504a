//! Builder for SettingsStateManager
//!
//! This module contains [`SettingsStateManagerBuilder`] which provides a fluent
//! API for creating a [`SettingsStateManager`].

use super::core::SettingsStateManager;
use crate::catalog::windows_catalog;
use crate::config::{
    BackupEncoding, BackupPolicy, EngineConfigBuilder, SchemaRegistry, WriteFailurePolicy,
};
use crate::error::Result;
use crate::storage::{JsonStorage, StorageBackend};
use crate::store::KeyValueStore;
use std::path::PathBuf;
use std::time::Duration;

/// Builder for creating a [`SettingsStateManager`] with a fluent API.
///
/// Without an explicit [`schema`](Self::schema) the built-in Windows catalog
/// is used.
///
/// # Example
///
/// ```rust,no_run
/// use regtune::{BackupPolicy, MemoryStore, SettingsStateManager};
///
/// let manager = SettingsStateManager::builder("tweaker", MemoryStore::new())
///     .data_dir("~/.local/share/tweaker")
///     .backup_policy(BackupPolicy::BestEffort)
///     .build()
///     .unwrap();
/// ```
pub struct SettingsStateManagerBuilder<K: KeyValueStore> {
    config_builder: EngineConfigBuilder,
    store: K,
    schema: Option<SchemaRegistry>,
}

impl<K: KeyValueStore> SettingsStateManagerBuilder<K> {
    pub fn new(app_name: impl Into<String>, store: K) -> Self {
        Self {
            config_builder: EngineConfigBuilder::new(app_name),
            store,
            schema: None,
        }
    }

    /// Set the data directory. Supports `~` expansion.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.data_dir(path);
        self
    }

    /// Set the backup filename (default: "backup.reg").
    pub fn backup_file(mut self, filename: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.backup_file(filename);
        self
    }

    pub fn backup_encoding(mut self, encoding: BackupEncoding) -> Self {
        self.config_builder = self.config_builder.backup_encoding(encoding);
        self
    }

    pub fn backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.config_builder = self.config_builder.backup_policy(policy);
        self
    }

    pub fn write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.config_builder = self.config_builder.write_failure_policy(policy);
        self
    }

    /// Create a system restore point before each apply (default: off).
    pub fn restore_point(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.restore_point(enabled);
        self
    }

    /// Pin the OS build instead of reading it from the store.
    pub fn os_build(mut self, build: u32) -> Self {
        self.config_builder = self.config_builder.os_build(build);
        self
    }

    /// Interval used by [`DriftPoller::start`](super::DriftPoller::start).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config_builder = self.config_builder.poll_interval(interval);
        self
    }

    /// Set the preferences filename (default: "preferences.<storage extension>").
    pub fn preferences_file(mut self, filename: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.preferences_file(filename);
        self
    }

    /// Use compact JSON (no pretty printing).
    pub fn compact_json(mut self) -> Self {
        self.config_builder = self.config_builder.compact_json();
        self
    }

    /// Use a custom setting catalog.
    pub fn schema(mut self, schema: SchemaRegistry) -> Self {
        self.schema = Some(schema);
        self
    }

    fn take_schema(schema: Option<SchemaRegistry>) -> Result<SchemaRegistry> {
        match schema {
            Some(schema) => Ok(schema),
            None => windows_catalog(),
        }
    }

    /// Build the [`SettingsStateManager`].
    ///
    /// Creates the data directory if it doesn't exist and performs the
    /// initial refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn build(self) -> Result<SettingsStateManager<K, JsonStorage>> {
        let schema = Self::take_schema(self.schema)?;
        SettingsStateManager::new(self.config_builder.build(), schema, self.store)
    }

    /// Build with a different profile/preferences storage format.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn build_with_storage<S: StorageBackend>(
        self,
        storage: S,
    ) -> Result<SettingsStateManager<K, S>> {
        let schema = Self::take_schema(self.schema)?;
        SettingsStateManager::new(
            self.config_builder.build_with_storage(storage),
            schema,
            self.store,
        )
    }
}

impl<K: KeyValueStore> SettingsStateManager<K, JsonStorage> {
    /// Create a builder for configuring a manager over `store`.
    pub fn builder(app_name: impl Into<String>, store: K) -> SettingsStateManagerBuilder<K> {
        SettingsStateManagerBuilder::new(app_name, store)
    }
}
