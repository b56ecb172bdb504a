//! Poison recovery for the engine's std::sync locks
//!
//! A listener or store implementation that panics while a lock is held must
//! not brick the engine for the rest of the session, so every lock site goes
//! through these helpers.

use crate::error::Result;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Extension trait for Mutex with poison recovery
pub trait MutexExt<T> {
    /// Lock the mutex, recovering from poison errors
    fn lock_recovered(&self) -> Result<MutexGuard<'_, T>>;
}

/// Extension trait for RwLock with poison recovery
pub trait RwLockExt<T> {
    /// Acquire a read lock, recovering from poison errors
    fn read_recovered(&self) -> Result<RwLockReadGuard<'_, T>>;

    /// Acquire a write lock, recovering from poison errors
    fn write_recovered(&self) -> Result<RwLockWriteGuard<'_, T>>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_recovered(&self) -> Result<MutexGuard<'_, T>> {
        Ok(self.lock().unwrap_or_else(|poisoned| {
            log::warn!("Engine state mutex was poisoned, recovering");
            poisoned.into_inner()
        }))
    }
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> Result<RwLockReadGuard<'_, T>> {
        Ok(self.read().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (read), recovering");
            poisoned.into_inner()
        }))
    }

    fn write_recovered(&self) -> Result<RwLockWriteGuard<'_, T>> {
        Ok(self.write().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (write), recovering");
            poisoned.into_inner()
        }))
    }
}
