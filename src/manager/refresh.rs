//! Reconciling instances with the external store

use super::core::{Change, EngineState, SettingsStateManager};
use crate::error::Result;
use crate::storage::StorageBackend;
use crate::store::KeyValueStore;
use log::info;
use serde::{Deserialize, Serialize};

/// Outcome of one drift poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Ids whose external value changed since the last read, declaration order
    pub changed: Vec<String>,
}

impl DriftReport {
    pub fn count(&self) -> usize {
        self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl<K: KeyValueStore, S: StorageBackend> SettingsStateManager<K, S> {
    /// Re-read every non-staged instance from the store
    fn resync(&self, state: &mut EngineState) -> Vec<Change> {
        let mut changes = Vec::new();
        for instance in state.instances.iter_mut().filter(|i| !i.is_staged()) {
            let fresh = self.read_external(instance.definition());
            if fresh != instance.external {
                changes.push(Change {
                    id: instance.id().to_string(),
                    old: std::mem::replace(&mut instance.external, fresh.clone()),
                    new: fresh,
                });
            }
        }
        changes
    }

    /// Read external values for all instances
    ///
    /// Instances with a staged edit are left untouched. Read failures fall
    /// back to the definition's default.
    ///
    /// # Errors
    ///
    /// Only fails if the state lock cannot be acquired.
    pub fn refresh(&self) -> Result<()> {
        let changes = {
            let mut state = self.lock_state()?;
            self.resync(&mut state)
        };
        self.notify_changes(&changes);
        Ok(())
    }

    /// Pick up changes made by other tools
    ///
    /// Re-reads every non-staged instance; a staged edit always wins over
    /// external drift. When something changed, drift listeners are told how
    /// many settings moved.
    ///
    /// # Errors
    ///
    /// Only fails if the state lock cannot be acquired.
    pub fn poll_drift(&self) -> Result<DriftReport> {
        let changes = {
            let mut state = self.lock_state()?;
            self.resync(&mut state)
        };

        for change in &changes {
            info!("External change detected: {} -> {}", change.id, change.new);
        }
        self.notify_changes(&changes);

        let report = DriftReport {
            changed: changes.into_iter().map(|c| c.id).collect(),
        };
        self.events.notify_drift(&report.changed);
        Ok(report)
    }

    /// Discard every staged edit and re-read the store
    ///
    /// Returns how many edits were discarded. The undo log is kept, so an
    /// `undo` afterwards can bring the last edit back.
    ///
    /// # Errors
    ///
    /// Only fails if the state lock cannot be acquired.
    pub fn revert_all(&self) -> Result<usize> {
        let (discarded, changes) = {
            let mut state = self.lock_state()?;
            let mut changes = Vec::new();
            let mut discarded = 0;

            for instance in state.instances.iter_mut() {
                let Some(staged) = instance.staged.take() else {
                    continue;
                };
                discarded += 1;
                let fresh = self.read_external(instance.definition());
                instance.external = fresh.clone();
                if staged != fresh {
                    changes.push(Change {
                        id: instance.id().to_string(),
                        old: staged,
                        new: fresh,
                    });
                }
            }
            changes.extend(self.resync(&mut state));
            (discarded, changes)
        };

        info!("Discarded {discarded} pending change(s)");
        self.notify_changes(&changes);
        Ok(discarded)
    }
}
