//! Durable snapshot files

use super::codec;
use super::snapshot::Snapshot;
use crate::config::BackupEncoding;
use crate::error::{Result, read_file, write_file_atomic};
use crate::security::set_secure_file_permissions;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Metadata about a written snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub path: PathBuf,

    /// SHA-256 of the file bytes, lowercase hex
    pub sha256: String,

    /// Number of values captured
    pub entries: usize,

    /// File size in bytes
    pub size: u64,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl BackupRecord {
    /// Check that the file on disk still matches the recorded digest
    ///
    /// # Errors
    ///
    /// Returns `Error::FileRead` if the file cannot be read.
    pub fn verify(&self) -> Result<bool> {
        let bytes = read_file(&self.path)?;
        Ok(digest(&bytes) == self.sha256)
    }
}

/// Write a snapshot to `path`, replacing any previous file
///
/// # Errors
///
/// Returns `Error::FileWrite`/`DirectoryCreate` when the file could not be
/// persisted.
pub fn write_snapshot(
    path: &Path,
    snapshot: &Snapshot,
    encoding: BackupEncoding,
) -> Result<BackupRecord> {
    let bytes = codec::encode(&codec::render(snapshot), encoding);
    write_file_atomic(path, &bytes)?;
    set_secure_file_permissions(path)?;

    let record = BackupRecord {
        path: path.to_path_buf(),
        sha256: digest(&bytes),
        entries: snapshot.len(),
        size: bytes.len() as u64,
        created_at: OffsetDateTime::now_utc(),
    };
    info!(
        "Snapshot of {} value(s) saved to {}",
        record.entries,
        path.display()
    );
    debug!("Snapshot digest: {}", record.sha256);
    Ok(record)
}

/// Read and parse a snapshot file
///
/// # Errors
///
/// Returns `Error::FileRead` or `Error::InvalidBackup`.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = read_file(path)?;
    codec::parse(&codec::decode(&bytes)?)
}

fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
