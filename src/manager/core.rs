use crate::config::{EngineConfig, RawValue, SchemaRegistry, SettingDefinition};
use crate::error::{Error, Result};
use crate::events::EventManager;
use crate::manager::instance::{SettingInstance, UndoEntry};
use crate::preferences::Preferences;
use crate::storage::{JsonStorage, StorageBackend};
use crate::store::{KeyValueStore, detect_os_build};
use crate::sync::{MutexExt, RwLockExt};

use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Mutable engine bookkeeping, only ever touched under the state lock
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    /// Active instances in declaration order
    pub(crate) instances: Vec<SettingInstance>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) undo_log: Vec<UndoEntry>,
}

impl EngineState {
    pub(crate) fn get(&self, id: &str) -> Option<&SettingInstance> {
        self.index.get(id).map(|&i| &self.instances[i])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut SettingInstance> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.instances[i]),
            None => Err(Error::SettingNotFound(id.to_string())),
        }
    }
}

/// A change of some instance's current value, reported after the lock is released
#[derive(Debug, Clone)]
pub(crate) struct Change {
    pub(crate) id: String,
    pub(crate) old: RawValue,
    pub(crate) new: RawValue,
}

/// Staged-edit state machine over a [`KeyValueStore`]
///
/// The `SettingsStateManager` owns one [`SettingInstance`] per active
/// definition and coordinates:
///
/// - **Refresh / drift**: read external values without clobbering edits
/// - **Staging**: edit, reset, undo, discard, load profiles
/// - **Apply**: back up pre-apply values, then write staged values
/// - **Events**: change, drift and apply notifications
///
/// All state lives behind a single mutex. Every operation, including a full
/// apply batch, runs as one critical section; listeners are invoked after the
/// lock is released.
///
/// # Example
///
/// ```rust
/// use regtune::{MemoryStore, SettingsStateManager};
///
/// # let dir = tempfile::tempdir().unwrap();
/// let manager = SettingsStateManager::builder("tweaker", MemoryStore::new())
///     .data_dir(dir.path())
///     .os_build(22631)
///     .build()
///     .unwrap();
///
/// manager.stage("show_ext", 0).unwrap();
/// assert_eq!(manager.pending_count(), 1);
///
/// let report = manager.apply_all().unwrap();
/// assert_eq!(report.counts(), (1, 0));
/// ```
pub struct SettingsStateManager<K: KeyValueStore, S: StorageBackend = JsonStorage> {
    pub(crate) config: EngineConfig<S>,

    pub(crate) store: Arc<K>,

    pub(crate) schema: Arc<SchemaRegistry>,

    /// OS build the version gates were evaluated against
    pub(crate) os_build: u32,

    pub(crate) state: Mutex<EngineState>,

    /// Event manager for change callbacks and validation
    pub(crate) events: Arc<EventManager>,

    pub(crate) preferences: RwLock<Preferences>,
}

impl<K: KeyValueStore, S: StorageBackend> SettingsStateManager<K, S> {
    /// Create a manager and perform the initial refresh.
    ///
    /// Creates the data directory if it doesn't exist. When the config does
    /// not pin an OS build it is read from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: EngineConfig<S>, schema: SchemaRegistry, store: K) -> Result<Self> {
        if !config.data_dir.exists() {
            crate::security::ensure_secure_dir(&config.data_dir)?;
        }

        let store = Arc::new(store);
        let os_build = config
            .os_build
            .unwrap_or_else(|| detect_os_build(store.as_ref()));

        let mut state = EngineState::default();
        for definition in schema.active_definitions(os_build) {
            state
                .index
                .insert(definition.id.clone(), state.instances.len());
            state.instances.push(SettingInstance::new(definition));
        }

        let preferences = Preferences::load(&config.storage, &config.preferences_path());

        info!(
            "Initialized regtune engine with {} of {} settings active (OS build {}) at {}",
            state.instances.len(),
            schema.len(),
            os_build,
            config.data_dir.display()
        );

        let manager = Self {
            config,
            store,
            schema: Arc::new(schema),
            os_build,
            state: Mutex::new(state),
            events: Arc::new(EventManager::new()),
            preferences: RwLock::new(preferences),
        };
        manager.refresh()?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig<S> {
        &self.config
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn os_build(&self) -> u32 {
        self.os_build
    }

    /// Get the event manager for registering listeners and validators
    ///
    /// # Example
    ///
    /// ```
    /// # use regtune::*;
    /// # let dir = tempfile::tempdir().unwrap();
    /// # let manager = SettingsStateManager::builder("test", MemoryStore::new())
    /// #     .data_dir(dir.path())
    /// #     .build()
    /// #     .unwrap();
    /// manager.events().on_drift(|count, _ids| {
    ///     println!("Detected {count} external change(s)");
    /// });
    ///
    /// manager.events().watch("menu_delay", |_id, _old, new| {
    ///     println!("Menu delay is now {new}");
    /// });
    ///
    /// manager.events().add_validator("menu_delay", |v: &RawValue| match v.as_integer() {
    ///     Some(n) if n % 10 == 0 => Ok(()),
    ///     _ => Err("must be a multiple of 10".into()),
    /// });
    /// ```
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Snapshot of one active instance
    pub fn instance(&self, id: &str) -> Option<SettingInstance> {
        self.lock_state().ok()?.get(id).cloned()
    }

    /// Snapshot of all active instances in declaration order
    pub fn instances(&self) -> Vec<SettingInstance> {
        self.lock_state()
            .map(|state| state.instances.clone())
            .unwrap_or_default()
    }

    /// Current value (staged or external) of an active setting
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingNotFound` for unknown or gated-out ids.
    pub fn current(&self, id: &str) -> Result<RawValue> {
        let state = self.lock_state()?;
        state
            .get(id)
            .map(|instance| instance.current().clone())
            .ok_or_else(|| Error::SettingNotFound(id.to_string()))
    }

    /// Ids with a staged edit, in declaration order
    pub fn pending_ids(&self) -> Vec<String> {
        self.lock_state()
            .map(|state| {
                state
                    .instances
                    .iter()
                    .filter(|i| i.is_staged())
                    .map(|i| i.id().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pending_count(&self) -> usize {
        self.lock_state()
            .map(|state| state.instances.iter().filter(|i| i.is_staged()).count())
            .unwrap_or(0)
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    pub fn undo_len(&self) -> usize {
        self.lock_state().map(|s| s.undo_log.len()).unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Favorites
    // -------------------------------------------------------------------------

    /// Pinned setting ids in the order they were pinned
    pub fn favorites(&self) -> Vec<String> {
        self.preferences
            .read_recovered()
            .map(|p| p.favorites.clone())
            .unwrap_or_default()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.preferences
            .read_recovered()
            .map(|p| p.is_favorite(id))
            .unwrap_or(false)
    }

    /// Pin or unpin a setting and persist the preference
    ///
    /// Returns whether the setting is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingNotFound` for ids outside the catalog, or file
    /// errors when the preferences cannot be saved.
    pub fn toggle_favorite(&self, id: &str) -> Result<bool> {
        if self.schema.get(id).is_none() {
            return Err(Error::SettingNotFound(id.to_string()));
        }
        let mut preferences = self.preferences.write_recovered()?;
        let pinned = preferences.toggle_favorite(id);
        preferences.save(&self.config.storage, &self.config.preferences_path())?;
        Ok(pinned)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    pub(crate) fn lock_state(&self) -> Result<MutexGuard<'_, EngineState>> {
        self.state.lock_recovered()
    }

    /// Definition of an active setting
    pub(crate) fn active_definition(&self, id: &str) -> Result<Arc<SettingDefinition>> {
        self.schema
            .get(id)
            .filter(|d| d.is_supported(self.os_build))
            .cloned()
            .ok_or_else(|| Error::SettingNotFound(id.to_string()))
    }

    /// Read a definition's external value, degrading failures to the default
    pub(crate) fn read_external(&self, definition: &SettingDefinition) -> RawValue {
        match self.store.read(&definition.location) {
            Ok(Some(data)) => definition.normalize(data.into()),
            Ok(None) => definition.normalize(definition.default.clone()),
            Err(e) => {
                warn!(
                    "Could not read {} ({}), using default: {e}",
                    definition.id, definition.location
                );
                definition.normalize(definition.default.clone())
            }
        }
    }

    pub(crate) fn notify_changes(&self, changes: &[Change]) {
        for change in changes {
            self.events.notify(&change.id, &change.old, &change.new);
        }
    }
}
