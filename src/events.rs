//! Event system for setting changes
//!
//! Provides reactive callbacks for staged edits, external drift and apply
//! results. Callbacks are invoked after the engine has released its state
//! lock, so a listener may call back into the manager.

use crate::config::RawValue;
use crate::manager::ApplyReport;
use crate::sync::RwLockExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

/// Callback receiving (`id`, `old_value`, `new_value`)
pub type ChangeCallback = Arc<dyn Fn(&str, &RawValue, &RawValue) + Send + Sync>;

/// Callback receiving the number of externally changed settings and their ids
pub type DriftCallback = Arc<dyn Fn(usize, &[String]) + Send + Sync>;

/// Callback receiving the outcome of an apply batch
pub type ApplyCallback = Arc<dyn Fn(&ApplyReport) + Send + Sync>;

/// Extra per-setting constraint, checked on stage after the kind's own rules
pub type Validator = Arc<dyn Fn(&RawValue) -> Result<(), String> + Send + Sync>;

/// Manages event listeners for the settings engine
#[derive(Default)]
pub struct EventManager {
    /// Global listeners (called for every setting)
    global_listeners: RwLock<Vec<ChangeCallback>>,

    /// Per-setting listeners
    key_listeners: RwLock<HashMap<String, Vec<ChangeCallback>>>,

    drift_listeners: RwLock<Vec<DriftCallback>>,

    apply_listeners: RwLock<Vec<ApplyCallback>>,

    validators: RwLock<HashMap<String, Vec<Validator>>>,
}

impl EventManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called whenever any setting's current value changes
    ///
    /// Fires for staged edits, undo, and externally detected changes.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &RawValue, &RawValue) + Send + Sync + 'static,
    {
        if let Ok(mut guard) = self.global_listeners.write_recovered() {
            guard.push(Arc::new(callback));
        }
    }

    /// Register a listener for a specific setting id
    pub fn watch<F>(&self, id: &str, callback: F)
    where
        F: Fn(&str, &RawValue, &RawValue) + Send + Sync + 'static,
    {
        if let Ok(mut listeners) = self.key_listeners.write_recovered() {
            listeners
                .entry(id.to_string())
                .or_default()
                .push(Arc::new(callback));
        }
    }

    /// Register a listener for drift detections (only called when count > 0)
    pub fn on_drift<F>(&self, callback: F)
    where
        F: Fn(usize, &[String]) + Send + Sync + 'static,
    {
        if let Ok(mut guard) = self.drift_listeners.write_recovered() {
            guard.push(Arc::new(callback));
        }
    }

    /// Register a listener for completed apply batches
    pub fn on_apply<F>(&self, callback: F)
    where
        F: Fn(&ApplyReport) + Send + Sync + 'static,
    {
        if let Ok(mut guard) = self.apply_listeners.write_recovered() {
            guard.push(Arc::new(callback));
        }
    }

    /// Register a validator for a specific setting id
    ///
    /// Validators run when a value is staged. If any validator returns an
    /// error, the edit is rejected.
    pub fn add_validator<F>(&self, id: &str, validator: F)
    where
        F: Fn(&RawValue) -> Result<(), String> + Send + Sync + 'static,
    {
        if let Ok(mut validators) = self.validators.write_recovered() {
            validators
                .entry(id.to_string())
                .or_default()
                .push(Arc::new(validator));
        }
    }

    /// Run the registered validators for `id`
    ///
    /// # Errors
    ///
    /// Returns the first validation error message if any validator fails.
    pub fn validate(&self, id: &str, value: &RawValue) -> Result<(), String> {
        let validators: Vec<Validator> = self
            .validators
            .read_recovered()
            .ok()
            .and_then(|guard| guard.get(id).cloned())
            .unwrap_or_default();
        for validator in validators {
            validator(value)?;
        }
        Ok(())
    }

    /// Notify change listeners
    pub fn notify(&self, id: &str, old_value: &RawValue, new_value: &RawValue) {
        // Snapshot the listener lists so callbacks may register more listeners
        let global: Vec<ChangeCallback> = self
            .global_listeners
            .read_recovered()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        for callback in &global {
            callback(id, old_value, new_value);
        }

        let keyed: Vec<ChangeCallback> = self
            .key_listeners
            .read_recovered()
            .ok()
            .and_then(|guard| guard.get(id).cloned())
            .unwrap_or_default();
        for callback in &keyed {
            callback(id, old_value, new_value);
        }
    }

    pub fn notify_drift(&self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        let listeners: Vec<DriftCallback> = self
            .drift_listeners
            .read_recovered()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        for callback in &listeners {
            callback(ids.len(), ids);
        }
    }

    pub fn notify_apply(&self, report: &ApplyReport) {
        let listeners: Vec<ApplyCallback> = self
            .apply_listeners
            .read_recovered()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        for callback in &listeners {
            callback(report);
        }
    }

    /// Remove all listeners for a specific setting id
    pub fn unwatch(&self, id: &str) {
        if let Ok(mut guard) = self.key_listeners.write_recovered() {
            guard.remove(id);
        }
    }

    /// Clear all listeners (validators are kept)
    pub fn clear(&self) {
        if let Ok(mut guard) = self.global_listeners.write_recovered() {
            guard.clear();
        }
        if let Ok(mut guard) = self.key_listeners.write_recovered() {
            guard.clear();
        }
        if let Ok(mut guard) = self.drift_listeners.write_recovered() {
            guard.clear();
        }
        if let Ok(mut guard) = self.apply_listeners.write_recovered() {
            guard.clear();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
