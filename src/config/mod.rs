//! Core configuration types
//!
//! This module contains the foundational types for the engine:
//! - `EngineConfig` - Configuration for the settings state manager
//! - `SettingDefinition` - Immutable description of one setting
//! - `SchemaRegistry` - Validated catalog of definitions

mod schema;
mod types;

pub use schema::{
    ChoiceOption, DisplayValue, RawValue, SchemaRegistry, SettingDefinition, SettingKind,
    SideEffect, ValueEncoding, opt,
};

pub use types::{
    BackupEncoding, BackupPolicy, EngineConfig, EngineConfigBuilder, WriteFailurePolicy,
};
