//! File permission helpers for backup and profile artifacts
//!
//! Backups capture the pre-apply state of machine-wide policy values, so the
//! engine's data directory is kept owner-only on Unix. On Windows these are
//! no-ops; the directory inherits the ACL of its parent.

use crate::error::{Error, Result};
use std::path::Path;

/// Restrict a file to owner read/write (Unix: 0o600)
///
/// # Errors
///
/// * `Error::FileRead` - If the file metadata cannot be read
/// * `Error::FileWrite` - If the permissions cannot be changed
#[cfg(unix)]
pub fn set_secure_file_permissions(path: &Path) -> Result<()> {
    set_mode(path, 0o600)
}

/// Restrict a directory to its owner (Unix: 0o700)
///
/// # Errors
///
/// * `Error::FileRead` - If the directory metadata cannot be read
/// * `Error::FileWrite` - If the permissions cannot be changed
#[cfg(unix)]
pub fn set_secure_dir_permissions(path: &Path) -> Result<()> {
    set_mode(path, 0o700)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .permissions();
    perms.set_mode(mode);

    std::fs::set_permissions(path, perms).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Ensure a directory exists; on Unix it is also locked down to the owner.
///
/// # Errors
///
/// * `Error::DirectoryCreate` - If the directory cannot be created
pub fn ensure_secure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })?;

    #[cfg(unix)]
    set_secure_dir_permissions(path)?;

    Ok(())
}

/// No-op on Windows (permissions managed via ACLs)
#[cfg(not(unix))]
pub fn set_secure_file_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// No-op on Windows (permissions managed via ACLs)
#[cfg(not(unix))]
pub fn set_secure_dir_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_secure_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/regtune");

        ensure_secure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&nested).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_secure_file_permissions() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("backup.reg");
        std::fs::write(&file_path, "data").unwrap();

        set_secure_file_permissions(&file_path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&file_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
