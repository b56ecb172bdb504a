//! # regtune - registry settings state engine
//!
//! A library for presenting a catalog of OS registry tweaks as typed settings,
//! with staged edits that only reach the registry on an explicit apply.
//!
//! ## Features
//!
//! - **Typed Catalog**: switches, choice lists and bounded integers mapped to
//!   registry values, gated by OS build
//! - **Staged Edits**: stage, reset, undo and discard without touching the store
//! - **Backups**: every apply first snapshots the previous values to a `.reg` file
//! - **Drift Detection**: notice values changed by other tools without losing edits
//! - **Profiles**: save and load portable desired-state files
//! - **Events**: change, drift and apply listeners plus custom validators
//!
//! ## Quick Start
//!
//! ```rust
//! use regtune::{MemoryStore, SettingsStateManager, SideEffect};
//!
//! # fn main() -> regtune::Result<()> {
//! # let dir = tempfile::tempdir().unwrap();
//! let manager = SettingsStateManager::builder("tweaker", MemoryStore::new())
//!     .data_dir(dir.path())
//!     .os_build(22631)
//!     .build()?;
//!
//! manager.stage("taskbar_align", 0)?;
//! manager.stage("menu_delay", 100)?;
//!
//! for change in manager.preview() {
//!     println!("{change}");
//! }
//!
//! let report = manager.apply_all()?;
//! assert!(report.is_success());
//! assert!(report.requires(SideEffect::ReauthSession));
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Catalogs
//!
//! ```rust
//! use regtune::{Location, MemoryStore, SchemaRegistry, SettingDefinition, SettingsStateManager};
//!
//! # fn main() -> regtune::Result<()> {
//! # let dir = tempfile::tempdir().unwrap();
//! let schema = SchemaRegistry::new([SettingDefinition::switch(
//!     "clock_seconds",
//!     "Show Seconds in Clock",
//!     Location::parse(
//!         r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced",
//!         "ShowSecondsInSystemClock",
//!     )?,
//!     1,
//!     0,
//!     0,
//! )
//! .page("Taskbar")])?;
//!
//! let manager = SettingsStateManager::builder("clock", MemoryStore::new())
//!     .data_dir(dir.path())
//!     .schema(schema)
//!     .build()?;
//! assert_eq!(manager.instances().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Drift Polling
//!
//! ```rust,no_run
//! use regtune::{DriftPoller, MemoryStore, SettingsStateManager};
//! use std::sync::Arc;
//!
//! # fn main() -> regtune::Result<()> {
//! let manager = Arc::new(SettingsStateManager::builder("tweaker", MemoryStore::new()).build()?);
//! manager.events().on_drift(|count, ids| {
//!     println!("{count} setting(s) changed outside the app: {ids:?}");
//! });
//!
//! let poller = DriftPoller::start(Arc::clone(&manager))?;
//! // ... poller stops when dropped
//! # drop(poller);
//! # Ok(())
//! # }
//! ```

pub mod backup;
#[rustfmt::skip]
pub mod catalog;
pub mod config;
pub mod docs;
pub mod error;
pub mod events;
mod manager;
pub mod preferences;
pub mod security;
pub mod storage;
pub mod store;
pub mod sync;

// Re-exports for convenience
pub use backup::{BackupRecord, Snapshot, SnapshotEntry};
pub use catalog::{WINDOWS_11, windows_catalog};
pub use config::{
    BackupEncoding, BackupPolicy, ChoiceOption, DisplayValue, EngineConfig, EngineConfigBuilder,
    RawValue, SchemaRegistry, SettingDefinition, SettingKind, SideEffect, ValueEncoding,
    WriteFailurePolicy, opt,
};
pub use docs::{DocsConfig, generate_docs};
pub use error::{Error, Result};
pub use events::EventManager;
pub use manager::{
    ApplyFailure, ApplyReport, DriftPoller, DriftReport, LoadReport, PendingChange, Profile,
    SettingInstance, SettingsStateManager, SettingsStateManagerBuilder, UndoEntry,
};
pub use preferences::Preferences;
pub use storage::{JsonStorage, StorageBackend};
#[cfg(feature = "toml")]
pub use storage::TomlStorage;
pub use store::{KeyValueStore, Location, MemoryStore, RegData, RegistryRoot, RegistryView};
#[cfg(windows)]
pub use store::WindowsRegistryStore;
