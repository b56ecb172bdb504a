//! Settings state engine
//!
//! This module contains [`SettingsStateManager`], the primary entry point for
//! staging, applying and reconciling registry settings. The implementation is
//! split by concern:
//!
//! - `core`: construction, queries and favorites
//! - `edit`: stage, reset, undo, discard
//! - `refresh`: refresh, drift polling, revert
//! - `apply`: backup and write
//! - `profiles`: profile save/load, pending export, backup restore, preview
//! - `poller`: background drift polling thread

mod apply;
mod builder;
mod core;
mod edit;
mod instance;
mod poller;
mod profiles;
mod refresh;

pub use apply::{ApplyFailure, ApplyReport};
pub use builder::SettingsStateManagerBuilder;
pub use core::SettingsStateManager;
pub use instance::{SettingInstance, UndoEntry};
pub use poller::DriftPoller;
pub use profiles::{LoadReport, PendingChange, Profile};
pub use refresh::DriftReport;
