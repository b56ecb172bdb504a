//! Staging operations: stage, reset, undo, discard

use super::core::{Change, EngineState, SettingsStateManager};
use super::instance::UndoEntry;
use crate::config::{DisplayValue, RawValue};
use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use crate::store::KeyValueStore;
use log::debug;

/// Set `id`'s staged slot for `value` and record the edit.
///
/// A value equal to `external` clears the slot. The undo entry is recorded
/// even when nothing changes.
pub(crate) fn stage_in(
    state: &mut EngineState,
    id: &str,
    value: RawValue,
) -> Result<Option<Change>> {
    let instance = state.get_mut(id)?;
    let previous = instance.current().clone();

    if value == instance.external {
        instance.staged = None;
    } else {
        instance.staged = Some(value.clone());
    }
    let now = instance.current().clone();

    state.undo_log.push(UndoEntry {
        id: id.to_string(),
        previous: previous.clone(),
        new: value,
    });

    Ok((previous != now).then(|| Change {
        id: id.to_string(),
        old: previous,
        new: now,
    }))
}

impl<K: KeyValueStore, S: StorageBackend> SettingsStateManager<K, S> {
    /// Stage a raw value for a setting
    ///
    /// The value is normalized to the setting's encoding first. Staging the
    /// external value clears the edit instead.
    ///
    /// # Errors
    ///
    /// - `Error::SettingNotFound` for unknown or gated-out ids
    /// - `Error::InvalidSettingValue` if the value violates the setting's kind
    ///   or a registered validator
    pub fn stage(&self, id: &str, value: impl Into<RawValue>) -> Result<()> {
        let definition = self.active_definition(id)?;
        let value = definition.normalize(value.into());
        let verdict = definition
            .validate(&value)
            .and_then(|()| self.events.validate(id, &value));

        let change = {
            let mut state = self.lock_state()?;
            let external = state.get_mut(id)?.external.clone();
            // Going back to the external value is always allowed
            if value != external {
                verdict.map_err(|reason| Error::InvalidSettingValue {
                    id: id.to_string(),
                    reason,
                })?;
            }
            stage_in(&mut state, id, value)?
        };

        debug!("Staged {id}");
        self.notify_changes(change.as_slice());
        Ok(())
    }

    /// Stage a value given in display form (checkbox state, choice index, number)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSettingValue` if the display value does not fit
    /// the setting's kind.
    pub fn stage_display(&self, id: &str, display: DisplayValue) -> Result<()> {
        let definition = self.active_definition(id)?;
        let value = definition
            .encode(&display)
            .map_err(|reason| Error::InvalidSettingValue {
                id: id.to_string(),
                reason,
            })?;
        self.stage(id, value)
    }

    /// Stage the setting's default value
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingNotFound` for unknown or gated-out ids.
    pub fn reset(&self, id: &str) -> Result<()> {
        let definition = self.active_definition(id)?;
        self.stage(id, definition.default.clone())
    }

    /// Stage defaults for every active setting on a page
    ///
    /// Returns how many settings were reset.
    ///
    /// # Errors
    ///
    /// Returns the first staging error.
    pub fn reset_page(&self, page: &str) -> Result<usize> {
        let ids: Vec<String> = self
            .instances()
            .iter()
            .filter(|i| i.definition().page == page)
            .map(|i| i.id().to_string())
            .collect();
        for id in &ids {
            self.reset(id)?;
        }
        Ok(ids.len())
    }

    /// Drop the staged edit for one setting
    ///
    /// Returns whether an edit was pending.
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingNotFound` for unknown or gated-out ids.
    pub fn discard(&self, id: &str) -> Result<bool> {
        let (was_staged, change) = {
            let mut state = self.lock_state()?;
            let instance = state.get_mut(id)?;
            if !instance.is_staged() {
                return Ok(false);
            }
            let external = instance.external.clone();
            (true, stage_in(&mut state, id, external)?)
        };
        self.notify_changes(change.as_slice());
        Ok(was_staged)
    }

    /// Revert the most recent staged edit
    ///
    /// Re-stages the entry's previous value (clearing the edit if that equals
    /// the external value). The inverse edit is itself recorded, so a second
    /// undo redoes the first. Returns the consumed entry, or `None` if the
    /// log is empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::SettingNotFound` if the entry's setting is no longer
    /// active.
    pub fn undo(&self) -> Result<Option<UndoEntry>> {
        let (entry, change) = {
            let mut state = self.lock_state()?;
            let Some(entry) = state.undo_log.pop() else {
                return Ok(None);
            };
            let change = stage_in(&mut state, &entry.id, entry.previous.clone())?;
            (entry, change)
        };

        debug!("Undid change to {}", entry.id);
        self.notify_changes(change.as_slice());
        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchemaRegistry, SettingDefinition};
    use crate::manager::instance::SettingInstance;
    use crate::store::Location;
    use std::sync::Arc;

    fn state() -> EngineState {
        let def = SettingDefinition::switch(
            "x",
            "X",
            Location::parse(r"HKCU\Software\Test", "X").unwrap(),
            1,
            0,
            1,
        );
        let registry = SchemaRegistry::new([def]).unwrap();
        let mut state = EngineState::default();
        for def in registry.active_definitions(0) {
            state.index.insert(def.id.clone(), state.instances.len());
            let mut instance = SettingInstance::new(Arc::clone(&def));
            instance.external = RawValue::Integer(0);
            state.instances.push(instance);
        }
        state
    }

    #[test]
    fn test_stage_in_records_noop_edits() {
        let mut state = state();

        let change = stage_in(&mut state, "x", RawValue::Integer(0)).unwrap();
        assert!(change.is_none());
        assert_eq!(state.undo_log.len(), 1);
        assert!(!state.get("x").unwrap().is_staged());
    }

    #[test]
    fn test_stage_back_to_external_clears() {
        let mut state = state();

        stage_in(&mut state, "x", RawValue::Integer(1)).unwrap();
        assert!(state.get("x").unwrap().is_staged());

        let change = stage_in(&mut state, "x", RawValue::Integer(0)).unwrap().unwrap();
        assert_eq!(change.old, RawValue::Integer(1));
        assert_eq!(change.new, RawValue::Integer(0));
        assert!(!state.get("x").unwrap().is_staged());
    }

    #[test]
    fn test_unknown_id() {
        let mut state = state();
        assert!(matches!(
            stage_in(&mut state, "nope", RawValue::Integer(1)),
            Err(Error::SettingNotFound(_))
        ));
    }
}
