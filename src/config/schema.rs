//! Setting definitions and the schema registry
//!
//! # Overview
//!
//! A [`SettingDefinition`] is the immutable description of one configurable
//! value: where it lives in the store, how it is physically encoded, and what
//! shape it has for the user:
//!
//! - [`SettingKind::Switch`] - an on/off toggle mapped to two raw values
//! - [`SettingKind::Choice`] - a fixed list of labelled raw values
//! - [`SettingKind::BoundedInteger`] - a number within `min..=max`
//!
//! Each kind owns its own `encode`/`decode` between the raw stored value and
//! the [`DisplayValue`] a presentation layer works with, so call sites never
//! branch on a type string.
//!
//! ```rust
//! use regtune::{Location, SettingDefinition, SideEffect, opt};
//!
//! # fn main() -> regtune::Result<()> {
//! let adv = r"HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced";
//!
//! let hidden = SettingDefinition::switch(
//!     "show_hidden",
//!     "Show Hidden Files",
//!     Location::parse(adv, "Hidden")?,
//!     1,
//!     2,
//!     2,
//! )
//! .page("File Explorer & UI")
//! .side_effect(SideEffect::ReauthSession);
//!
//! let launch_to = SettingDefinition::choice(
//!     "explorer_launchto",
//!     "Open File Explorer to",
//!     Location::parse(adv, "LaunchTo")?,
//!     vec![opt("Home", 0), opt("This PC", 1), opt("Quick Access", 2)],
//!     1,
//! );
//! # let _ = (hidden, launch_to);
//! # Ok(())
//! # }
//! ```
//!
//! # Schema Validation
//!
//! [`SchemaRegistry::new`] validates every definition and rejects the whole
//! catalog with `Error::SchemaViolation` on duplicate ids, empty or
//! ambiguous choice lists, inverted ranges or invalid defaults.

use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use crate::store::{Location, mask_dword, parse_integer};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*$").expect("identifier pattern is valid")
});

// =============================================================================
// Values
// =============================================================================

/// A raw setting value as staged, exported and written to profiles
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Text(String),
}

impl RawValue {
    /// Integer view of the value; text is parsed as decimal or `0x` hex
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawValue::Integer(n) => Some(*n),
            RawValue::Text(s) => parse_integer(s),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            RawValue::Integer(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(n) => write!(f, "{n}"),
            RawValue::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Integer(n)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Integer(i64::from(n))
    }
}

impl From<u32> for RawValue {
    fn from(n: u32) -> Self {
        RawValue::Integer(i64::from(n))
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

/// Physical encoding of a value in the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// 32-bit unsigned integer
    #[default]
    Dword,
    /// String
    Text,
}

impl ValueEncoding {
    /// Canonical form of `value` under this encoding.
    ///
    /// Dword settings hold integers (numeric text is parsed) reduced to the
    /// unsigned 32 bits the store keeps; text settings hold strings (integers
    /// are formatted). Unparseable text is kept as-is.
    pub fn normalize(self, value: RawValue) -> RawValue {
        match (self, value) {
            (ValueEncoding::Dword, RawValue::Integer(n)) => {
                RawValue::Integer(i64::from(mask_dword(n)))
            }
            (ValueEncoding::Dword, RawValue::Text(s)) => match parse_integer(&s) {
                Some(n) => RawValue::Integer(i64::from(mask_dword(n))),
                None => RawValue::Text(s),
            },
            (ValueEncoding::Text, RawValue::Integer(n)) => RawValue::Text(n.to_string()),
            (_, value) => value,
        }
    }
}

/// What the host must do after a setting is applied for it to take effect
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    #[default]
    None,
    /// The shell session (e.g. Explorer) must be restarted
    ReauthSession,
    /// The user must sign out and back in
    SignOut,
    /// The machine must be restarted
    Restart,
}

impl SideEffect {
    pub fn describe(self) -> &'static str {
        match self {
            SideEffect::None => "takes effect immediately",
            SideEffect::ReauthSession => "requires shell restart",
            SideEffect::SignOut => "requires sign-out",
            SideEffect::Restart => "requires restart",
        }
    }
}

// =============================================================================
// Kinds
// =============================================================================

/// One entry of a [`SettingKind::Choice`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: i64,
}

/// Shorthand for creating a [`ChoiceOption`]
///
/// ```rust
/// use regtune::opt;
/// let options = vec![opt("Left", 0), opt("Center", 1)];
/// ```
pub fn opt(label: impl Into<String>, value: i64) -> ChoiceOption {
    ChoiceOption {
        label: label.into(),
        value,
    }
}

/// User-facing shape of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingKind {
    Switch { on: i64, off: i64 },
    Choice { options: Vec<ChoiceOption> },
    BoundedInteger { min: i64, max: i64, step: i64 },
}

/// Value as a presentation layer renders it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayValue {
    Switch(bool),
    /// Index into the choice list
    Choice(usize),
    Integer(i64),
}

impl SettingKind {
    /// Map a raw value to its display form.
    ///
    /// Values the kind does not recognise still render: a switch shows
    /// "off", a choice selects its first option, a bounded integer falls
    /// back to `fallback`.
    pub fn decode(&self, value: &RawValue, fallback: &RawValue) -> DisplayValue {
        match self {
            SettingKind::Switch { on, .. } => DisplayValue::Switch(value.as_integer() == Some(*on)),
            SettingKind::Choice { options } => {
                let n = value.as_integer();
                let index = options
                    .iter()
                    .position(|o| Some(o.value) == n)
                    .unwrap_or(0);
                DisplayValue::Choice(index)
            }
            SettingKind::BoundedInteger { .. } => DisplayValue::Integer(
                value
                    .as_integer()
                    .or_else(|| fallback.as_integer())
                    .unwrap_or(0),
            ),
        }
    }

    /// Map a display value back to a raw integer value
    pub fn encode(&self, display: &DisplayValue) -> std::result::Result<i64, String> {
        match (self, display) {
            (SettingKind::Switch { on, off }, DisplayValue::Switch(checked)) => {
                Ok(if *checked { *on } else { *off })
            }
            (SettingKind::Choice { options }, DisplayValue::Choice(index)) => options
                .get(*index)
                .map(|o| o.value)
                .ok_or_else(|| format!("choice index {index} out of range")),
            (SettingKind::BoundedInteger { min, max, .. }, DisplayValue::Integer(n)) => {
                if n < min || n > max {
                    Err(format!("{n} is outside {min}..={max}"))
                } else {
                    Ok(*n)
                }
            }
            (kind, display) => Err(format!("{display:?} does not fit a {} setting", kind.name())),
        }
    }

    /// Check that a raw value is one this kind can stage
    pub fn validate(&self, value: &RawValue) -> std::result::Result<(), String> {
        let n = value
            .as_integer()
            .ok_or_else(|| format!("{value} is not an integer"))?;
        match self {
            SettingKind::Switch { on, off } => {
                if n != *on && n != *off {
                    return Err(format!("{n} is neither on ({on}) nor off ({off})"));
                }
            }
            SettingKind::Choice { options } => {
                if !options.iter().any(|o| o.value == n) {
                    return Err(format!("{n} is not one of the available choices"));
                }
            }
            SettingKind::BoundedInteger { min, max, .. } => {
                if n < *min || n > *max {
                    return Err(format!("{n} is outside {min}..={max}"));
                }
            }
        }
        Ok(())
    }

    /// Whether any raw value of this kind is negative
    pub fn is_signed(&self) -> bool {
        match self {
            SettingKind::Switch { on, off } => *on < 0 || *off < 0,
            SettingKind::Choice { options } => options.iter().any(|o| o.value < 0),
            SettingKind::BoundedInteger { min, .. } => *min < 0,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SettingKind::Switch { .. } => "switch",
            SettingKind::Choice { .. } => "choice",
            SettingKind::BoundedInteger { .. } => "bounded integer",
        }
    }
}

// =============================================================================
// Setting Definition
// =============================================================================

/// Immutable description of one configurable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDefinition {
    /// Globally unique identifier
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tooltip: String,
    /// Top-level grouping (one page of a settings UI)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub page: String,
    /// Second-level grouping inside a page
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section: String,
    pub location: Location,
    pub kind: SettingKind,
    #[serde(default)]
    pub encoding: ValueEncoding,
    pub default: RawValue,
    /// Minimum OS build this setting applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_build: Option<u32>,
    #[serde(default)]
    pub side_effect: SideEffect,
}

impl SettingDefinition {
    fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        location: Location,
        kind: SettingKind,
        default: i64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tooltip: String::new(),
            page: String::new(),
            section: String::new(),
            location,
            kind,
            encoding: ValueEncoding::Dword,
            default: RawValue::Integer(default),
            min_build: None,
            side_effect: SideEffect::None,
        }
    }

    /// Create an on/off switch
    pub fn switch(
        id: impl Into<String>,
        label: impl Into<String>,
        location: Location,
        on: i64,
        off: i64,
        default: i64,
    ) -> Self {
        Self::new(id, label, location, SettingKind::Switch { on, off }, default)
    }

    /// Create an enumerated choice
    pub fn choice(
        id: impl Into<String>,
        label: impl Into<String>,
        location: Location,
        options: Vec<ChoiceOption>,
        default: i64,
    ) -> Self {
        Self::new(id, label, location, SettingKind::Choice { options }, default)
    }

    /// Create a bounded integer
    pub fn bounded(
        id: impl Into<String>,
        label: impl Into<String>,
        location: Location,
        min: i64,
        max: i64,
        step: i64,
        default: i64,
    ) -> Self {
        Self::new(
            id,
            label,
            location,
            SettingKind::BoundedInteger { min, max, step },
            default,
        )
    }

    #[must_use]
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    #[must_use]
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    /// Store the value as a string instead of a 32-bit integer
    #[must_use]
    pub fn text_encoded(mut self) -> Self {
        self.encoding = ValueEncoding::Text;
        self.default = self.encoding.normalize(self.default);
        self
    }

    #[must_use]
    pub fn min_build(mut self, build: u32) -> Self {
        self.min_build = Some(build);
        self
    }

    #[must_use]
    pub fn side_effect(mut self, effect: SideEffect) -> Self {
        self.side_effect = effect;
        self
    }

    /// Whether the OS version gate admits this setting
    pub fn is_supported(&self, os_build: u32) -> bool {
        self.min_build.is_none_or(|gate| os_build >= gate)
    }

    /// Canonical form of a value for this setting.
    ///
    /// Staged, written and read-back values all pass through here so they
    /// compare equal. Dword values of a signed kind are read as two's
    /// complement, so `-1` survives a round trip through the store.
    pub fn normalize(&self, value: RawValue) -> RawValue {
        match self.encoding.normalize(value) {
            RawValue::Integer(n)
                if self.encoding == ValueEncoding::Dword && self.kind.is_signed() =>
            {
                RawValue::Integer(i64::from(n as u32 as i32))
            }
            value => value,
        }
    }

    /// Check a value against the kind's constraints
    pub fn validate(&self, value: &RawValue) -> std::result::Result<(), String> {
        self.kind.validate(value)
    }

    pub fn decode(&self, value: &RawValue) -> DisplayValue {
        self.kind.decode(value, &self.default)
    }

    /// Encode a display value into a raw value in this setting's encoding
    pub fn encode(&self, display: &DisplayValue) -> std::result::Result<RawValue, String> {
        self.kind
            .encode(display)
            .map(|n| self.normalize(RawValue::Integer(n)))
    }

    /// Validate the definition itself
    ///
    /// Checks:
    /// - identifier format and non-empty label
    /// - choice list non-empty with unique encoded values
    /// - `min <= max` and positive step for bounded integers
    /// - default value satisfies the kind
    pub fn validate_schema(&self) -> std::result::Result<(), String> {
        if !ID_PATTERN.is_match(&self.id) {
            return Err(format!(
                "identifier must match {}",
                ID_PATTERN.as_str()
            ));
        }
        if self.label.trim().is_empty() {
            return Err("label cannot be empty".to_string());
        }

        match &self.kind {
            SettingKind::Switch { on, off } => {
                if on == off {
                    return Err(format!("on and off encode the same value ({on})"));
                }
            }
            SettingKind::Choice { options } => {
                if options.is_empty() {
                    return Err("choice list cannot be empty".to_string());
                }
                let mut seen = HashSet::new();
                for option in options {
                    if !seen.insert(option.value) {
                        return Err(format!("duplicate choice value {}", option.value));
                    }
                }
            }
            SettingKind::BoundedInteger { min, max, step } => {
                if min > max {
                    return Err(format!("min ({min}) cannot be greater than max ({max})"));
                }
                if *step <= 0 {
                    return Err(format!("step must be positive, got {step}"));
                }
            }
        }

        self.validate(&self.default)
            .map_err(|e| format!("default value is invalid: {e}"))
    }
}

// =============================================================================
// Schema Registry
// =============================================================================

/// Validated, immutable catalog of setting definitions in declaration order
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    definitions: Vec<Arc<SettingDefinition>>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Build a registry, validating every definition.
    ///
    /// # Errors
    ///
    /// Returns `Error::SchemaViolation` for the first invalid or duplicate
    /// definition.
    pub fn new(definitions: impl IntoIterator<Item = SettingDefinition>) -> Result<Self> {
        let mut registry = Self {
            definitions: Vec::new(),
            index: HashMap::new(),
        };

        for mut definition in definitions {
            definition.default = definition.normalize(definition.default.clone());
            definition
                .validate_schema()
                .map_err(|reason| Error::SchemaViolation {
                    id: definition.id.clone(),
                    reason,
                })?;
            if registry.index.contains_key(&definition.id) {
                return Err(Error::SchemaViolation {
                    id: definition.id.clone(),
                    reason: "duplicate identifier".into(),
                });
            }
            registry
                .index
                .insert(definition.id.clone(), registry.definitions.len());
            registry.definitions.push(Arc::new(definition));
        }

        Ok(registry)
    }

    /// Load a catalog from a file (a list of definitions)
    ///
    /// # Errors
    ///
    /// Returns file/parse errors, or `SchemaViolation` if the catalog is invalid.
    pub fn load<S: StorageBackend>(storage: &S, path: &Path) -> Result<Self> {
        let definitions: Vec<SettingDefinition> = storage.read(path)?;
        Self::new(definitions)
    }

    /// Definitions whose version gate is satisfied, in declaration order
    pub fn active_definitions(&self, os_build: u32) -> Vec<Arc<SettingDefinition>> {
        self.definitions
            .iter()
            .filter(|d| d.is_supported(os_build))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SettingDefinition>> {
        self.index.get(id).map(|&i| &self.definitions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SettingDefinition>> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Distinct page names in first-seen order
    pub fn pages(&self) -> Vec<&str> {
        let mut pages: Vec<&str> = Vec::new();
        for definition in &self.definitions {
            if !pages.contains(&definition.page.as_str()) {
                pages.push(&definition.page);
            }
        }
        pages
    }

    /// Case-insensitive search over id, label, tooltip, page and section
    pub fn search(&self, query: &str) -> Vec<&Arc<SettingDefinition>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.definitions
            .iter()
            .filter(|d| {
                [&d.label, &d.tooltip, &d.page, &d.section, &d.id]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
