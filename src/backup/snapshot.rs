//! Immutable sets of `(location, encoding, value)` entries

use crate::config::{RawValue, ValueEncoding};
use crate::store::Location;

/// One value captured in a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub location: Location,
    pub encoding: ValueEncoding,
    pub value: RawValue,
}

/// Values captured for backup or export, grouped by key path on render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, location: Location, encoding: ValueEncoding, value: RawValue) {
        self.entries.push(SnapshotEntry {
            location,
            encoding,
            value,
        });
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by `ROOT\key\path`, groups in first-seen order
    pub fn groups(&self) -> Vec<(String, Vec<&SnapshotEntry>)> {
        let mut groups: Vec<(String, Vec<&SnapshotEntry>)> = Vec::new();
        for entry in &self.entries {
            let key_path = entry.location.key_path();
            match groups
                .iter_mut()
                .find(|(path, _)| path.eq_ignore_ascii_case(&key_path))
            {
                Some((_, members)) => members.push(entry),
                None => groups.push((key_path, vec![entry])),
            }
        }
        groups
    }

    /// Value recorded for a location, if any (last entry wins)
    pub fn get(&self, location: &Location) -> Option<&SnapshotEntry> {
        self.entries.iter().rev().find(|entry| {
            entry.location.root == location.root
                && entry.location.path.eq_ignore_ascii_case(&location.path)
                && entry.location.name.eq_ignore_ascii_case(&location.name)
        })
    }
}

impl FromIterator<SnapshotEntry> for Snapshot {
    fn from_iter<I: IntoIterator<Item = SnapshotEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
