//! Common test utilities for regtune integration tests
//!
//! Provides a small catalog, a store handle shared with the engine, and a
//! fixture owning the temporary data directory.

#![allow(dead_code)]

use regtune::{
    JsonStorage, Location, MemoryStore, RegData, SchemaRegistry, SettingDefinition,
    SettingsStateManager, SettingsStateManagerBuilder, SideEffect, opt,
};
use std::path::PathBuf;
use tempfile::TempDir;

pub const ADVANCED: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced";
pub const DESKTOP: &str = r"HKCU\Control Panel\Desktop";
pub const POLICIES: &str = r"HKLM\SOFTWARE\Policies\Microsoft\Windows\System";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn loc(path: &str, name: &str) -> Location {
    Location::parse(path, name).expect("valid location")
}

// =============================================================================
// Test Catalog
// =============================================================================

/// Location of the `x` switch
pub fn x_loc() -> Location {
    loc(ADVANCED, "X")
}

pub fn align_loc() -> Location {
    loc(ADVANCED, "TaskbarAl")
}

pub fn delay_loc() -> Location {
    loc(DESKTOP, "MenuShowDelay")
}

pub fn activity_loc() -> Location {
    loc(POLICIES, "PublishUserActivities")
}

/// Four settings covering every kind and encoding:
///
/// - `x`: switch on=1 off=0 default=1
/// - `align`: choice 0/1, build 22000+, needs a shell restart
/// - `delay`: text-encoded bounded integer 0..=2000 step 10
/// - `activity`: machine-wide switch, needs a sign-out
pub fn test_schema() -> SchemaRegistry {
    SchemaRegistry::new([
        SettingDefinition::switch("x", "Switch X", x_loc(), 1, 0, 1)
            .page("General")
            .section("Switches"),
        SettingDefinition::choice(
            "align",
            "Taskbar Alignment",
            align_loc(),
            vec![opt("Left", 0), opt("Center", 1)],
            1,
        )
        .page("Taskbar")
        .min_build(22000)
        .side_effect(SideEffect::ReauthSession),
        SettingDefinition::bounded("delay", "Menu Delay", delay_loc(), 0, 2000, 10, 400)
            .text_encoded()
            .page("General")
            .section("Menus"),
        SettingDefinition::switch("activity", "Activity History", activity_loc(), 1, 0, 1)
            .page("Privacy")
            .side_effect(SideEffect::SignOut),
    ])
    .expect("valid test schema")
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Temporary data directory plus a store handle shared with the manager
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub store: MemoryStore,
    pub manager: SettingsStateManager<MemoryStore, JsonStorage>,
}

impl TestFixture {
    /// Manager over an empty store on a Windows 11 build
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Manager over a pre-populated store
    pub fn with_store(store: MemoryStore) -> Self {
        Self::configure(store, |builder| builder)
    }

    /// Manager with extra builder options applied
    pub fn configure(
        store: MemoryStore,
        f: impl FnOnce(
            SettingsStateManagerBuilder<MemoryStore>,
        ) -> SettingsStateManagerBuilder<MemoryStore>,
    ) -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let builder = SettingsStateManager::builder("test-app", store.clone())
            .data_dir(temp_dir.path())
            .os_build(22631)
            .schema(test_schema());
        let manager = f(builder).build().expect("Failed to create manager");

        Self {
            temp_dir,
            store,
            manager,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn backup_path(&self) -> PathBuf {
        self.temp_dir.path().join("backup.reg")
    }

    /// Simulate another tool writing a dword
    pub fn set_external(&self, location: Location, value: u32) {
        self.store.insert(location, RegData::Dword(value));
    }

    pub fn stored(&self, location: &Location) -> Option<RegData> {
        self.store.get(location)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
