//! Runtime records pairing a definition with its external and staged values

use crate::config::{DisplayValue, RawValue, SettingDefinition};
use std::sync::Arc;

/// Live state of one active setting
///
/// `external` is the last value observed in the store (or the default when
/// the value is missing or unreadable). `staged` holds a user edit that has
/// not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingInstance {
    definition: Arc<SettingDefinition>,
    pub(crate) external: RawValue,
    pub(crate) staged: Option<RawValue>,
}

impl SettingInstance {
    pub(crate) fn new(definition: Arc<SettingDefinition>) -> Self {
        let external = definition.default.clone();
        Self {
            definition,
            external,
            staged: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn definition(&self) -> &Arc<SettingDefinition> {
        &self.definition
    }

    pub fn external(&self) -> &RawValue {
        &self.external
    }

    pub fn staged(&self) -> Option<&RawValue> {
        self.staged.as_ref()
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Staged value if any, otherwise the external one
    pub fn current(&self) -> &RawValue {
        self.staged.as_ref().unwrap_or(&self.external)
    }

    /// Current value as a presentation layer renders it
    pub fn display(&self) -> DisplayValue {
        self.definition.decode(self.current())
    }
}

/// Record of one staged edit, consumed LIFO by `undo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    pub id: String,
    /// Value that was current before the edit
    pub previous: RawValue,
    pub new: RawValue,
}
