//! Error types for regtune

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for regtune operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for regtune
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Key/value store Errors
    // -------------------------------------------------------------------------
    #[error("Value not found: {0}")]
    NotFound(String),

    #[error("Invalid store location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("Store read failed for {location}: {reason}")]
    StoreRead { location: String, reason: String },

    #[error("Store write failed for {location}: {reason}")]
    StoreWrite { location: String, reason: String },

    #[error("Restore point failed: {0}")]
    Checkpoint(String),

    // -------------------------------------------------------------------------
    // Schema / Setting Errors
    // -------------------------------------------------------------------------
    #[error("Schema violation for '{id}': {reason}")]
    SchemaViolation { id: String, reason: String },

    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    #[error("Invalid value for {id}: {reason}")]
    InvalidSettingValue { id: String, reason: String },

    // -------------------------------------------------------------------------
    // Backup Errors
    // -------------------------------------------------------------------------
    #[error("Backup write failed, apply aborted: {0}")]
    BackupWriteFailed(String),

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal lock was poisoned - possible thread panic")]
    LockPoisoned,
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::SettingNotFound(_))
    }

    /// Check if this is a backup-related error
    #[must_use]
    pub fn is_backup_error(&self) -> bool {
        matches!(self, Error::BackupWriteFailed(_) | Error::InvalidBackup(_))
    }

    /// Check if this error came from the external key/value store
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::InvalidLocation { .. }
                | Error::StoreRead { .. }
                | Error::StoreWrite { .. }
                | Error::Checkpoint(_)
        )
    }
}

// =============================================================================
// Filesystem Helper Functions
// =============================================================================

/// Create a directory (and parents) with proper error handling
pub fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read a whole file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write content to a file with proper error handling
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write content via a sibling temp file and rename it into place
pub fn write_file_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir(parent)?;
    }

    let file_name = path.file_name().ok_or_else(|| {
        Error::Config(format!(
            "Invalid path '{}': must have a filename",
            path.display()
        ))
    })?;
    let mut temp_filename = file_name.to_os_string();
    temp_filename.push(".tmp");
    let temp_path = path.with_file_name(temp_filename);

    write_file(&temp_path, contents)?;

    std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
