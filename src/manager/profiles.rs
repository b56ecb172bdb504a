//! Profiles, exports, backup restore and change preview

use super::core::SettingsStateManager;
use crate::backup::{BackupRecord, Snapshot, read_snapshot, write_snapshot};
use crate::config::{RawValue, SideEffect, ValueEncoding};
use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use crate::store::{KeyValueStore, Location};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Portable desired-state mapping from setting id to raw value
pub type Profile = BTreeMap<String, RawValue>;

/// Outcome of staging a profile or backup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Entries that were staged (including ones equal to the current value)
    pub staged: usize,
    /// Entries naming no active setting
    pub unknown: usize,
    /// Entries rejected by the setting's constraints
    pub invalid: usize,
}

/// One line of the pending-change preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub id: String,
    pub label: String,
    pub location: Location,
    pub encoding: ValueEncoding,
    pub from: RawValue,
    pub to: RawValue,
    pub side_effect: SideEffect,
}

impl fmt::Display for PendingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = match self.encoding {
            ValueEncoding::Dword => "dword",
            ValueEncoding::Text => "sz",
        };
        write!(
            f,
            "{}  [{encoding}]  {}  ->  {}",
            self.location, self.from, self.to
        )?;
        if self.side_effect != SideEffect::None {
            write!(f, "  ({})", self.side_effect.describe())?;
        }
        Ok(())
    }
}

impl<K: KeyValueStore, S: StorageBackend> SettingsStateManager<K, S> {
    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    /// Current value of every active setting
    pub fn export_profile(&self) -> Profile {
        self.instances()
            .into_iter()
            .map(|i| (i.id().to_string(), i.current().clone()))
            .collect()
    }

    /// Write [`export_profile`](Self::export_profile) to a file using the
    /// configured storage backend
    ///
    /// # Errors
    ///
    /// Returns serialization or file write errors.
    pub fn save_profile(&self, path: &Path) -> Result<()> {
        let profile = self.export_profile();
        self.config.storage.write(path, &profile)?;
        info!("Profile with {} setting(s) saved to {}", profile.len(), path.display());
        Ok(())
    }

    /// Stage every entry of a profile that names an active setting
    ///
    /// Entries are staged in declaration order. Loading never writes to the
    /// store; the result is pending until `apply_all`.
    ///
    /// # Errors
    ///
    /// Only fails if the state lock cannot be acquired. Unknown and invalid
    /// entries are counted in the report.
    pub fn load_profile(&self, profile: &Profile) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let active: Vec<String> = self.instances().iter().map(|i| i.id().to_string()).collect();

        for id in &active {
            let Some(value) = profile.get(id) else {
                continue;
            };
            match self.stage(id, value.clone()) {
                Ok(()) => report.staged += 1,
                Err(Error::InvalidSettingValue { reason, .. }) => {
                    warn!("Skipping profile value for {id}: {reason}");
                    report.invalid += 1;
                }
                Err(e) => return Err(e),
            }
        }
        report.unknown = profile.keys().filter(|id| !active.contains(id)).count();

        info!(
            "Profile loaded: {} staged, {} unknown, {} invalid",
            report.staged, report.unknown, report.invalid
        );
        Ok(report)
    }

    /// Read a profile file and stage it
    ///
    /// # Errors
    ///
    /// Returns file or parse errors.
    pub fn load_profile_from(&self, path: &Path) -> Result<LoadReport> {
        let profile: Profile = self.config.storage.read(path)?;
        self.load_profile(&profile)
    }

    // -------------------------------------------------------------------------
    // Export / Restore
    // -------------------------------------------------------------------------

    /// Snapshot of all staged values
    pub fn export_pending(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for instance in self.instances() {
            if let Some(value) = instance.staged() {
                let definition = instance.definition();
                snapshot.push(definition.location.clone(), definition.encoding, value.clone());
            }
        }
        snapshot
    }

    /// Write the staged values to a file in registry-export format
    ///
    /// # Errors
    ///
    /// Returns file write errors.
    pub fn export_pending_to(&self, path: &Path) -> Result<BackupRecord> {
        write_snapshot(path, &self.export_pending(), self.config.backup_encoding)
    }

    /// Stage the values recorded in a snapshot file (e.g. the last pre-apply
    /// backup), matching entries to settings by location
    ///
    /// # Errors
    ///
    /// Returns file read errors or `Error::InvalidBackup`.
    pub fn restore_backup(&self, path: &Path) -> Result<LoadReport> {
        let snapshot = read_snapshot(path)?;
        let mut report = LoadReport::default();

        let instances = self.instances();
        for entry in snapshot.entries() {
            let target = instances.iter().find(|i| {
                let loc = &i.definition().location;
                loc.root == entry.location.root
                    && loc.path.eq_ignore_ascii_case(&entry.location.path)
                    && loc.name.eq_ignore_ascii_case(&entry.location.name)
            });
            let Some(instance) = target else {
                report.unknown += 1;
                continue;
            };
            match self.stage(instance.id(), entry.value.clone()) {
                Ok(()) => report.staged += 1,
                Err(Error::InvalidSettingValue { reason, .. }) => {
                    warn!("Skipping backup value for {}: {reason}", instance.id());
                    report.invalid += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Backup {} staged: {} value(s), {} unmatched",
            path.display(),
            report.staged,
            report.unknown
        );
        Ok(report)
    }

    /// Restore from the configured backup file
    ///
    /// # Errors
    ///
    /// Returns `Error::FileRead` when no backup has been written yet.
    pub fn restore_last_backup(&self) -> Result<LoadReport> {
        self.restore_backup(&self.config.backup_path())
    }

    /// Describe every pending change, declaration order
    pub fn preview(&self) -> Vec<PendingChange> {
        self.instances()
            .into_iter()
            .filter_map(|instance| {
                let to = instance.staged()?.clone();
                let definition = instance.definition();
                Some(PendingChange {
                    id: definition.id.clone(),
                    label: definition.label.clone(),
                    location: definition.location.clone(),
                    encoding: definition.encoding,
                    from: instance.external().clone(),
                    to,
                    side_effect: definition.side_effect,
                })
            })
            .collect()
    }
}
