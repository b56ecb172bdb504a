//! External key/value store contract
//!
//! The engine never talks to the operating system directly. Everything it
//! knows about the world goes through [`KeyValueStore`]: a hierarchical,
//! typed namespace addressed by `(root, view, subkey path, value name)`.
//!
//! - [`MemoryStore`] is a portable in-process implementation, used by tests
//!   and by hosts that want to preview a catalog without touching the OS.
//! - `WindowsRegistryStore` (Windows only) maps the contract onto the real
//!   registry.

mod memory;
#[cfg(windows)]
mod windows;

pub use memory::MemoryStore;
#[cfg(windows)]
pub use windows::WindowsRegistryStore;

use crate::config::{RawValue, ValueEncoding};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key path holding the OS build number, read when no build is configured.
pub const CURRENT_VERSION_PATH: &str =
    r"HKEY_LOCAL_MACHINE\SOFTWARE\Microsoft\Windows NT\CurrentVersion";
/// Value name of the OS build number under [`CURRENT_VERSION_PATH`].
pub const CURRENT_BUILD_VALUE: &str = "CurrentBuildNumber";

// =============================================================================
// Roots, views and locations
// =============================================================================

/// Named root of the store namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegistryRoot {
    CurrentUser,
    LocalMachine,
    ClassesRoot,
    Users,
    CurrentConfig,
}

impl RegistryRoot {
    /// Canonical long name, as used in export file headers
    pub fn long_name(self) -> &'static str {
        match self {
            RegistryRoot::CurrentUser => "HKEY_CURRENT_USER",
            RegistryRoot::LocalMachine => "HKEY_LOCAL_MACHINE",
            RegistryRoot::ClassesRoot => "HKEY_CLASSES_ROOT",
            RegistryRoot::Users => "HKEY_USERS",
            RegistryRoot::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }
}

impl FromStr for RegistryRoot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HKEY_CURRENT_USER" | "HKCU" => Ok(RegistryRoot::CurrentUser),
            "HKEY_LOCAL_MACHINE" | "HKLM" => Ok(RegistryRoot::LocalMachine),
            "HKEY_CLASSES_ROOT" | "HKCR" => Ok(RegistryRoot::ClassesRoot),
            "HKEY_USERS" | "HKU" => Ok(RegistryRoot::Users),
            "HKEY_CURRENT_CONFIG" | "HKCC" => Ok(RegistryRoot::CurrentConfig),
            _ => Err(Error::InvalidLocation {
                location: s.to_string(),
                reason: "unknown root".into(),
            }),
        }
    }
}

impl fmt::Display for RegistryRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Which registry view a location is resolved in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryView {
    /// Native width (64-bit on 64-bit Windows)
    #[default]
    Native,
    /// The 32-bit redirected view (WOW6432Node)
    Wow64_32,
}

/// Fully resolved address of one value in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub root: RegistryRoot,
    #[serde(default)]
    pub view: RegistryView,
    /// Subkey path below the root, backslash separated
    pub path: String,
    /// Value name inside the key
    pub name: String,
}

impl Location {
    /// Parse a `ROOT\sub\key` path plus value name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLocation` if the path has no subkey part, names an
    /// unknown root, or the value name is empty.
    pub fn parse(full_path: &str, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: &str| Error::InvalidLocation {
            location: format!("{full_path}\\{name}"),
            reason: reason.to_string(),
        };

        let (root, subkey) = full_path
            .split_once('\\')
            .ok_or_else(|| invalid("path must be ROOT\\subkey"))?;
        let subkey = subkey.trim_matches('\\');
        if subkey.is_empty() {
            return Err(invalid("empty subkey"));
        }
        if name.is_empty() {
            return Err(invalid("empty value name"));
        }
        let root = root.parse::<RegistryRoot>().map_err(|_| invalid("unknown root"))?;

        Ok(Self {
            root,
            view: RegistryView::Native,
            path: subkey.to_string(),
            name,
        })
    }

    /// Resolve this location in the 32-bit view instead of the native one
    #[must_use]
    pub fn wow64_32(mut self) -> Self {
        self.view = RegistryView::Wow64_32;
        self
    }

    /// `ROOT\sub\key`, the group header used by snapshot files
    pub fn key_path(&self) -> String {
        format!("{}\\{}", self.root.long_name(), self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.key_path(), self.name)?;
        if self.view == RegistryView::Wow64_32 {
            f.write_str(" (32-bit view)")?;
        }
        Ok(())
    }
}

// =============================================================================
// Stored data
// =============================================================================

/// A value as physically held by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegData {
    Dword(u32),
    Text(String),
}

impl RegData {
    /// Convert an engine value into store data for the given encoding.
    ///
    /// Integers written as `Dword` are masked to 32 bits, never rejected.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSettingValue` when text that is not an integer
    /// is written with the `Dword` encoding.
    pub fn encode(location: &Location, value: &RawValue, encoding: ValueEncoding) -> Result<Self> {
        match (encoding, value) {
            (ValueEncoding::Dword, RawValue::Integer(n)) => Ok(RegData::Dword(mask_dword(*n))),
            (ValueEncoding::Dword, RawValue::Text(s)) => parse_integer(s)
                .map(|n| RegData::Dword(mask_dword(n)))
                .ok_or_else(|| Error::InvalidSettingValue {
                    id: location.to_string(),
                    reason: format!("'{s}' is not an integer"),
                }),
            (ValueEncoding::Text, RawValue::Integer(n)) => Ok(RegData::Text(n.to_string())),
            (ValueEncoding::Text, RawValue::Text(s)) => Ok(RegData::Text(s.clone())),
        }
    }

    /// Encoding this data was stored with
    pub fn encoding(&self) -> ValueEncoding {
        match self {
            RegData::Dword(_) => ValueEncoding::Dword,
            RegData::Text(_) => ValueEncoding::Text,
        }
    }
}

impl From<RegData> for RawValue {
    fn from(data: RegData) -> Self {
        match data {
            RegData::Dword(n) => RawValue::Integer(i64::from(n)),
            RegData::Text(s) => RawValue::Text(s),
        }
    }
}

/// Truncate to the low 32 bits (two's complement for negatives)
pub fn mask_dword(value: i64) -> u32 {
    (value & 0xFFFF_FFFF) as u32
}

/// Parse decimal or `0x`-prefixed hexadecimal integers
pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<i64>().ok()
    }
}

// =============================================================================
// Store contract
// =============================================================================

/// Contract over a hierarchical, typed key/value namespace.
///
/// Implementations must be shareable across threads: the drift poller reads
/// through the same store as the edit/apply path.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read a value.
    ///
    /// Returns `Ok(None)` when the key or value does not exist. Any other
    /// failure (permission denied, unreadable type) is an `Err`; the engine
    /// degrades those to the setting's default.
    fn read(&self, location: &Location) -> Result<Option<RegData>>;

    /// Write a value, creating the key path if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreWrite` (or `InvalidSettingValue` for unencodable
    /// values) when the write did not happen.
    fn write(&self, location: &Location, value: &RawValue, encoding: ValueEncoding) -> Result<()>;

    /// Create a system restore point before a batch of writes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Checkpoint` if no restore point was created. Stores
    /// without restore points always fail.
    fn checkpoint(&self, description: &str) -> Result<()> {
        Err(Error::Checkpoint(format!(
            "restore points are not supported by this store ({description})"
        )))
    }
}

/// Read the OS build number from the store, `0` when unavailable.
pub fn detect_os_build<K: KeyValueStore + ?Sized>(store: &K) -> u32 {
    let location = match Location::parse(CURRENT_VERSION_PATH, CURRENT_BUILD_VALUE) {
        Ok(location) => location,
        Err(_) => return 0,
    };
    let build = match store.read(&location) {
        Ok(Some(RegData::Text(s))) => s.trim().parse::<u32>().ok(),
        Ok(Some(RegData::Dword(n))) => Some(n),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Could not read OS build number: {e}");
            None
        }
    };
    build.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_long_and_short_roots() {
        let long = Location::parse(
            r"HKEY_CURRENT_USER\Software\Microsoft\Windows\DWM",
            "ColorPrevalence",
        )
        .unwrap();
        let short = Location::parse(r"HKCU\Software\Microsoft\Windows\DWM", "ColorPrevalence")
            .unwrap();

        assert_eq!(long, short);
        assert_eq!(long.root, RegistryRoot::CurrentUser);
        assert_eq!(long.path, r"Software\Microsoft\Windows\DWM");
        assert_eq!(
            long.key_path(),
            r"HKEY_CURRENT_USER\Software\Microsoft\Windows\DWM"
        );
    }

    #[test]
    fn test_parse_location_rejects_bad_paths() {
        for (path, name) in [
            ("HKEY_CURRENT_USER", "x"),
            (r"HKEY_NOWHERE\Software", "x"),
            (r"HKCU\", "x"),
            (r"HKCU\Software", ""),
        ] {
            let err = Location::parse(path, name).unwrap_err();
            assert!(matches!(err, Error::InvalidLocation { .. }), "{path}");
        }
    }

    #[test]
    fn test_dword_encoding_masks_instead_of_rejecting() {
        let loc = Location::parse(r"HKLM\SOFTWARE\Test", "Value").unwrap();

        let big = RegData::encode(&loc, &RawValue::Integer(0x1_0000_0005), ValueEncoding::Dword)
            .unwrap();
        assert_eq!(big, RegData::Dword(5));

        let negative =
            RegData::encode(&loc, &RawValue::Integer(-1), ValueEncoding::Dword).unwrap();
        assert_eq!(negative, RegData::Dword(0xFFFF_FFFF));

        let hex_text =
            RegData::encode(&loc, &RawValue::Text("0x10".into()), ValueEncoding::Dword).unwrap();
        assert_eq!(hex_text, RegData::Dword(16));

        assert!(
            RegData::encode(&loc, &RawValue::Text("abc".into()), ValueEncoding::Dword).is_err()
        );
    }

    #[test]
    fn test_detect_os_build() {
        let store = MemoryStore::new();
        assert_eq!(detect_os_build(&store), 0);

        store.insert(
            Location::parse(CURRENT_VERSION_PATH, CURRENT_BUILD_VALUE).unwrap(),
            RegData::Text("22631".into()),
        );
        assert_eq!(detect_os_build(&store), 22631);
    }
}
