//! Observable scanner state.
//!
//! The manager commits every transition through a [`StateStore`]; readers
//! either take a snapshot or subscribe to change notifications. Writers
//! notify only after the closure has committed all fields.

use codescan_core::{CameraDevice, ScanResult};
use std::sync::Arc;
use tokio::sync::watch;

/// Continuously readable scanner state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannerState {
    /// A session exists and its start sequence completed
    pub is_scanning: bool,
    /// Most recent decode, live or static
    pub last_scan_result: Option<ScanResult>,
    /// Most recent recorded failure
    pub last_error: Option<String>,
    /// Cameras from the last successful enumeration
    pub available_cameras: Vec<CameraDevice>,
    /// Torch is lit; implies `is_torch_available`
    pub is_torch_on: bool,
    /// The active video track supports a torch
    pub is_torch_available: bool,
}

impl ScannerState {
    /// Whether enumeration found at least one camera.
    #[must_use]
    pub fn has_cameras(&self) -> bool {
        !self.available_cameras.is_empty()
    }
}

/// Shared handle over the scanner state watch channel.
#[derive(Debug, Clone)]
pub struct StateStore {
    sender: Arc<watch::Sender<ScannerState>>,
}

impl StateStore {
    /// Create a store holding the initial idle state.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ScannerState::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Clone of the latest committed state.
    #[must_use]
    pub fn snapshot(&self) -> ScannerState {
        self.sender.borrow().clone()
    }

    /// Read a projection of the latest committed state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&ScannerState) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Receiver notified after each committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScannerState> {
        self.sender.subscribe()
    }

    /// Commit a change and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut ScannerState)) {
        self.sender.send_modify(f);
    }

    /// Commit a change, notifying only when `f` reports a modification.
    ///
    /// `f` runs under the store's write lock, so a check and the mutation it
    /// guards are atomic with respect to other writers.
    pub fn update_if(&self, f: impl FnOnce(&mut ScannerState) -> bool) -> bool {
        self.sender.send_if_modified(f)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
