//! Committing staged edits to the store

use super::core::{Change, SettingsStateManager};
use crate::backup::{BackupRecord, Snapshot, write_snapshot};
use crate::config::{BackupPolicy, SideEffect, WriteFailurePolicy};
use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use crate::store::KeyValueStore;
use log::{error, info, warn};
use std::collections::BTreeSet;

/// A staged value the store refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of [`SettingsStateManager::apply_all`]
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Ids written successfully, declaration order
    pub applied: Vec<String>,

    pub failures: Vec<ApplyFailure>,

    /// Whether the system restore point was created, `None` when restore
    /// points are off
    pub restore_point: Option<bool>,

    /// The pre-apply backup, if one was written
    pub backup: Option<BackupRecord>,

    /// Distinct follow-up actions required by the applied settings
    pub side_effects: Vec<SideEffect>,
}

impl ApplyReport {
    /// `(applied, failed)`
    pub fn counts(&self) -> (usize, usize) {
        (self.applied.len(), self.failures.len())
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether nothing was pending
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.failures.is_empty()
    }

    pub fn requires(&self, effect: SideEffect) -> bool {
        self.side_effects.contains(&effect)
    }
}

impl<K: KeyValueStore, S: StorageBackend> SettingsStateManager<K, S> {
    /// Write every staged edit to the store
    ///
    /// 1. With [`restore_point`](crate::EngineConfig::restore_point) on, ask
    ///    the store for a system restore point. A failure is logged and
    ///    reported but does not stop the batch.
    /// 2. Snapshot the pre-apply external values of all staged settings and
    ///    persist it to the backup file.
    /// 3. Write each staged value in declaration order.
    /// 4. Successful writes become the new external value. Failed writes are
    ///    counted and handled per [`WriteFailurePolicy`].
    ///
    /// The whole batch runs under the state lock, so drift polling and other
    /// edits wait until it completes. There is no rollback of writes that
    /// succeeded before a failure.
    ///
    /// An empty pending set is a no-op: no backup is written.
    ///
    /// # Errors
    ///
    /// Returns `Error::BackupWriteFailed` under [`BackupPolicy::Required`] when
    /// the backup could not be written. Nothing has been written to the store
    /// in that case and all edits remain staged. Individual store write
    /// failures are reported in the [`ApplyReport`], never as `Err`.
    pub fn apply_all(&self) -> Result<ApplyReport> {
        let (report, changes) = {
            let mut state = self.lock_state()?;
            let staged: Vec<usize> = state
                .instances
                .iter()
                .enumerate()
                .filter(|(_, i)| i.is_staged())
                .map(|(index, _)| index)
                .collect();
            if staged.is_empty() {
                return Ok(ApplyReport::default());
            }

            let restore_point = self.config.restore_point.then(|| {
                let description =
                    format!("{} before {} change(s)", self.config.app_name, staged.len());
                match self.store.checkpoint(&description) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Could not create restore point, continuing: {e}");
                        false
                    }
                }
            });

            let mut snapshot = Snapshot::new();
            for &index in &staged {
                let instance = &state.instances[index];
                let definition = instance.definition();
                snapshot.push(
                    definition.location.clone(),
                    definition.encoding,
                    instance.external.clone(),
                );
            }

            let backup_path = self.config.backup_path();
            let written = write_snapshot(&backup_path, &snapshot, self.config.backup_encoding);
            let backup = match written {
                Ok(record) => Some(record),
                Err(e) => match self.config.backup_policy {
                    BackupPolicy::Required => {
                        error!("Backup to {} failed, apply aborted: {e}", backup_path.display());
                        return Err(Error::BackupWriteFailed(e.to_string()));
                    }
                    BackupPolicy::BestEffort => {
                        warn!("Backup to {} failed, applying anyway: {e}", backup_path.display());
                        None
                    }
                },
            };

            let mut report = ApplyReport {
                restore_point,
                backup,
                ..ApplyReport::default()
            };
            let mut side_effects = BTreeSet::new();
            let mut changes = Vec::new();

            for index in staged {
                let instance = &mut state.instances[index];
                let Some(value) = instance.staged.clone() else {
                    continue;
                };
                let definition = instance.definition().clone();

                match self.store.write(&definition.location, &value, definition.encoding) {
                    Ok(()) => {
                        instance.external = value;
                        instance.staged = None;
                        report.applied.push(definition.id.clone());
                        if definition.side_effect != SideEffect::None {
                            side_effects.insert(definition.side_effect);
                        }
                    }
                    Err(e) => {
                        error!("Failed to apply {}: {e}", definition.id);
                        report.failures.push(ApplyFailure {
                            id: definition.id.clone(),
                            reason: e.to_string(),
                        });
                        if self.config.write_failure_policy == WriteFailurePolicy::Discard {
                            instance.staged = None;
                            changes.push(Change {
                                id: definition.id.clone(),
                                old: value,
                                new: instance.external.clone(),
                            });
                        }
                    }
                }
            }

            report.side_effects = side_effects.into_iter().collect();
            (report, changes)
        };

        let (applied, failed) = report.counts();
        if failed > 0 {
            warn!("Applied {applied} change(s) with {failed} failure(s)");
        } else {
            info!("Applied {applied} change(s)");
        }

        self.notify_changes(&changes);
        self.events.notify_apply(&report);
        Ok(report)
    }
}
