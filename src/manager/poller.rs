//! Background drift polling

use super::core::SettingsStateManager;
use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use crate::store::KeyValueStore;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Calls [`SettingsStateManager::poll_drift`] on a fixed interval from a
/// background thread
///
/// Polls serialize with every other engine operation through the state lock,
/// so a poll never interleaves with an apply batch. The thread stops when the
/// poller is stopped or dropped.
pub struct DriftPoller {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DriftPoller {
    /// Start polling at the manager's configured interval
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the interval is zero or the thread cannot
    /// be spawned.
    pub fn start<K, S>(manager: Arc<SettingsStateManager<K, S>>) -> Result<Self>
    where
        K: KeyValueStore,
        S: StorageBackend + 'static,
    {
        let interval = manager.config().poll_interval;
        Self::with_interval(manager, interval)
    }

    /// Start polling at a custom interval
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the interval is zero or the thread cannot
    /// be spawned.
    pub fn with_interval<K, S>(
        manager: Arc<SettingsStateManager<K, S>>,
        interval: Duration,
    ) -> Result<Self>
    where
        K: KeyValueStore,
        S: StorageBackend + 'static,
    {
        if interval.is_zero() {
            return Err(Error::Config("drift poll interval must be greater than zero".into()));
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("regtune-drift-poller".into())
            .spawn(move || {
                debug!("Drift poller started ({interval:?})");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if let Err(e) = manager.poll_drift() {
                                warn!("Drift poll failed: {e}");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Drift poller stopped");
            })
            .map_err(|e| Error::Config(format!("failed to spawn drift poller: {e}")))?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and wait for an in-flight poll to finish
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Drift poller thread panicked");
        }
    }
}

impl Drop for DriftPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
