//! Windows registry adapter backed by `winreg`

use super::{KeyValueStore, Location, RegData, RegistryRoot, RegistryView};
use crate::config::{RawValue, ValueEncoding};
use crate::error::{Error, Result};
use log::info;
use std::io;
use std::process::Command;
use winreg::RegKey;
use winreg::enums::{
    HKEY, HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
    HKEY_USERS, KEY_READ, KEY_WOW64_32KEY, KEY_WOW64_64KEY, KEY_WRITE,
};

/// [`KeyValueStore`] over the live Windows registry
#[derive(Debug, Default, Clone)]
pub struct WindowsRegistryStore;

impl WindowsRegistryStore {
    pub fn new() -> Self {
        Self
    }
}

fn predef(root: RegistryRoot) -> HKEY {
    match root {
        RegistryRoot::CurrentUser => HKEY_CURRENT_USER,
        RegistryRoot::LocalMachine => HKEY_LOCAL_MACHINE,
        RegistryRoot::ClassesRoot => HKEY_CLASSES_ROOT,
        RegistryRoot::Users => HKEY_USERS,
        RegistryRoot::CurrentConfig => HKEY_CURRENT_CONFIG,
    }
}

fn view_flag(view: RegistryView) -> u32 {
    match view {
        RegistryView::Native => KEY_WOW64_64KEY,
        RegistryView::Wow64_32 => KEY_WOW64_32KEY,
    }
}

impl KeyValueStore for WindowsRegistryStore {
    fn read(&self, location: &Location) -> Result<Option<RegData>> {
        let read_error = |e: io::Error| Error::StoreRead {
            location: location.to_string(),
            reason: e.to_string(),
        };

        let root = RegKey::predef(predef(location.root));
        let key = match root
            .open_subkey_with_flags(&location.path, KEY_READ | view_flag(location.view))
        {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_error(e)),
        };

        match key.get_value::<u32, _>(&location.name) {
            Ok(n) => return Ok(Some(RegData::Dword(n))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            // Present but not a DWORD; try it as a string below
            Err(_) => {}
        }

        match key.get_value::<String, _>(&location.name) {
            Ok(s) => Ok(Some(RegData::Text(s))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_error(e)),
        }
    }

    fn write(&self, location: &Location, value: &RawValue, encoding: ValueEncoding) -> Result<()> {
        let write_error = |e: io::Error| Error::StoreWrite {
            location: location.to_string(),
            reason: e.to_string(),
        };

        let data = RegData::encode(location, value, encoding)?;
        let root = RegKey::predef(predef(location.root));
        let (key, _) = root
            .create_subkey_with_flags(&location.path, KEY_WRITE | view_flag(location.view))
            .map_err(write_error)?;

        match &data {
            RegData::Dword(n) => key.set_value(&location.name, n),
            RegData::Text(s) => key.set_value(&location.name, s),
        }
        .map_err(write_error)?;

        info!("Registry set: {location} = {data:?}");
        Ok(())
    }

    /// Runs `Checkpoint-Computer`, which needs an elevated process and System
    /// Protection enabled on the system drive.
    fn checkpoint(&self, description: &str) -> Result<()> {
        let script = format!(
            "Checkpoint-Computer -Description '{}' -RestorePointType 'MODIFY_SETTINGS'",
            description.replace('\'', "''")
        );
        let status = Command::new("powershell.exe")
            .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", &script])
            .status()
            .map_err(|e| Error::Checkpoint(e.to_string()))?;
        if !status.success() {
            return Err(Error::Checkpoint(format!("powershell exited with {status}")));
        }

        info!("System restore point created: {description}");
        Ok(())
    }
}
