//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::{JsonStorage, StorageBackend};

/// What happens to a staged edit whose store write failed during apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailurePolicy {
    /// Drop the edit; the instance shows whatever the store now holds
    #[default]
    Discard,
    /// Keep the edit staged so the user can retry
    Retain,
}

/// Whether a failed pre-apply backup blocks the batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Abort the batch before any store write and keep all staged edits
    #[default]
    Required,
    /// Log the failure and write anyway
    BestEffort,
}

/// Text encoding of backup and export files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupEncoding {
    /// UTF-16 little endian with byte order mark, what `regedit` writes
    #[default]
    Utf16Le,
    Utf8,
}

/// Configuration for initializing the SettingsStateManager
#[derive(Debug, Clone)]
pub struct EngineConfig<S: StorageBackend = JsonStorage> {
    /// Directory holding the backup and preferences files
    pub data_dir: PathBuf,

    /// Application name (used for the default data directory)
    pub app_name: String,

    /// Filename of the pre-apply backup, overwritten on every apply
    pub backup_file: String,

    pub backup_encoding: BackupEncoding,

    pub backup_policy: BackupPolicy,

    pub write_failure_policy: WriteFailurePolicy,

    /// Ask the store for a system restore point before each apply batch
    pub restore_point: bool,

    /// OS build used for version gates. `None` reads it from the store.
    pub os_build: Option<u32>,

    /// Period of the background drift poller
    pub poll_interval: Duration,

    /// Filename of the persisted preferences (favorites)
    pub preferences_file: String,

    /// Storage backend for profiles and preferences
    pub storage: S,
}

impl Default for EngineConfig<JsonStorage> {
    fn default() -> Self {
        EngineConfigBuilder::new("regtune").build()
    }
}

impl<S: StorageBackend> EngineConfig<S> {
    /// Full path of the pre-apply backup file
    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(&self.backup_file)
    }

    /// Full path of the preferences file
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(&self.preferences_file)
    }
}

impl EngineConfig<JsonStorage> {
    /// Create a new builder for EngineConfig
    ///
    /// # Example
    /// ```rust
    /// use regtune::{BackupPolicy, EngineConfig};
    ///
    /// let config = EngineConfig::builder("tweaker")
    ///     .data_dir("~/.config/tweaker")
    ///     .backup_policy(BackupPolicy::BestEffort)
    ///     .build();
    /// ```
    pub fn builder(app_name: impl Into<String>) -> EngineConfigBuilder {
        EngineConfigBuilder::new(app_name)
    }
}

/// Builder for creating EngineConfig with a fluent API
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    data_dir: Option<PathBuf>,
    app_name: String,
    backup_file: String,
    backup_encoding: BackupEncoding,
    backup_policy: BackupPolicy,
    write_failure_policy: WriteFailurePolicy,
    restore_point: bool,
    os_build: Option<u32>,
    poll_interval: Duration,
    preferences_file: Option<String>,
    pretty_json: bool,
}

impl EngineConfigBuilder {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            data_dir: None,
            app_name: app_name.into(),
            backup_file: "backup.reg".into(),
            backup_encoding: BackupEncoding::default(),
            backup_policy: BackupPolicy::default(),
            write_failure_policy: WriteFailurePolicy::default(),
            restore_point: false,
            os_build: None,
            poll_interval: Duration::from_secs(4),
            preferences_file: None,
            pretty_json: true,
        }
    }

    /// Set the data directory
    ///
    /// Supports `~` expansion for home directory.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let expanded = match (path.strip_prefix("~"), dirs::home_dir()) {
            (Ok(rest), Some(home)) => home.join(rest),
            _ => path,
        };
        self.data_dir = Some(expanded);
        self
    }

    /// Set the backup filename (default: "backup.reg")
    pub fn backup_file(mut self, filename: impl Into<String>) -> Self {
        self.backup_file = filename.into();
        self
    }

    pub fn backup_encoding(mut self, encoding: BackupEncoding) -> Self {
        self.backup_encoding = encoding;
        self
    }

    pub fn backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.backup_policy = policy;
        self
    }

    pub fn write_failure_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure_policy = policy;
        self
    }

    /// Create a system restore point before each apply (default: off)
    pub fn restore_point(mut self, enabled: bool) -> Self {
        self.restore_point = enabled;
        self
    }

    /// Pin the OS build instead of reading it from the store
    pub fn os_build(mut self, build: u32) -> Self {
        self.os_build = Some(build);
        self
    }

    /// Drift polling period (default: 4 seconds)
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the preferences filename (default: "preferences.<storage extension>")
    pub fn preferences_file(mut self, filename: impl Into<String>) -> Self {
        self.preferences_file = Some(filename.into());
        self
    }

    /// Use compact JSON (no pretty printing)
    pub fn compact_json(mut self) -> Self {
        self.pretty_json = false;
        self
    }

    /// Build with the JSON storage backend
    ///
    /// If `data_dir` is not set, uses the system config directory for the app.
    pub fn build(self) -> EngineConfig<JsonStorage> {
        let storage = if self.pretty_json {
            JsonStorage::new()
        } else {
            JsonStorage::compact()
        };
        self.build_with_storage(storage)
    }

    /// Build with a custom storage backend (e.g. `TomlStorage`)
    pub fn build_with_storage<S: StorageBackend>(self, storage: S) -> EngineConfig<S> {
        let data_dir = self.data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join(&self.app_name))
                .unwrap_or_else(|| PathBuf::from("."))
        });

        EngineConfig {
            data_dir,
            app_name: self.app_name,
            backup_file: self.backup_file,
            backup_encoding: self.backup_encoding,
            backup_policy: self.backup_policy,
            write_failure_policy: self.write_failure_policy,
            restore_point: self.restore_point,
            os_build: self.os_build,
            poll_interval: self.poll_interval,
            preferences_file: self
                .preferences_file
                .unwrap_or_else(|| format!("preferences.{}", storage.extension())),
            storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder("tweaker").build();

        assert_eq!(config.app_name, "tweaker");
        assert_eq!(config.backup_file, "backup.reg");
        assert_eq!(config.backup_policy, BackupPolicy::Required);
        assert_eq!(config.write_failure_policy, WriteFailurePolicy::Discard);
        assert_eq!(config.backup_encoding, BackupEncoding::Utf16Le);
        assert_eq!(config.poll_interval, Duration::from_secs(4));
        assert!(!config.restore_point);
        assert!(config.os_build.is_none());
        assert!(config.preferences_path().ends_with("preferences.json"));
    }

    #[test]
    fn test_builder_with_options() {
        let config = EngineConfig::builder("tweaker")
            .data_dir("/tmp/tweaker")
            .backup_file("before-apply.reg")
            .os_build(22631)
            .write_failure_policy(WriteFailurePolicy::Retain)
            .compact_json()
            .build();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tweaker"));
        assert_eq!(
            config.backup_path(),
            PathBuf::from("/tmp/tweaker/before-apply.reg")
        );
        assert_eq!(config.os_build, Some(22631));
    }

    #[test]
    fn test_tilde_expansion() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = EngineConfig::builder("tweaker")
            .data_dir("~/tweaker-data")
            .build();

        assert_eq!(config.data_dir, home.join("tweaker-data"));
    }
}
