//! Session manager: owns the single live scanning session.
//!
//! This module provides the [`SessionManager`], which opens and closes the
//! decoding engine, publishes [`ScannerState`], runs the torch capability
//! probe and applies torch constraints. It is the only component that talks
//! to the engine or the host media layer.

use crate::error::{Result, SessionError};
use crate::probe;
use crate::state::{ScannerState, StateStore};
use codescan_core::{
    CameraDevice, CameraSelector, DecodeMiss, ProbeSettings, ScanConfiguration, ScanResult,
    ScannerSettings, StaticImage, SurfaceId,
};
use codescan_engine::{DecodeEngine, DecodeSink, EngineHandle, MediaHost, TrackConstraints};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type SuccessFn = dyn Fn(ScanResult) + Send + Sync;
type MissFn = dyn Fn(DecodeMiss) + Send + Sync;

/// Caller callbacks for a live session.
#[derive(Clone)]
pub struct ScanCallbacks {
    on_success: Arc<SuccessFn>,
    on_error: Option<Arc<MissFn>>,
}

impl ScanCallbacks {
    /// Callbacks invoking `on_success` for every decoded code.
    pub fn new(on_success: impl Fn(ScanResult) + Send + Sync + 'static) -> Self {
        Self {
            on_success: Arc::new(on_success),
            on_error: None,
        }
    }

    /// Also invoke `on_error` for every frame without a code.
    #[must_use]
    pub fn with_error(mut self, on_error: impl Fn(DecodeMiss) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(on_error));
        self
    }
}

impl fmt::Debug for ScanCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanCallbacks")
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

/// The live session, present from engine start to engine stop.
#[derive(Debug)]
struct ActiveSession {
    surface: SurfaceId,
    camera: CameraSelector,
    handle: EngineHandle,
    probe: CancellationToken,
}

#[derive(Debug)]
enum SessionSlot {
    Idle,
    /// Engine start in flight; blocks a second start
    Starting,
    Active(ActiveSession),
    /// Engine stop in flight
    Stopping,
}

/// Returns the slot to `Idle` if a start is abandoned mid-flight.
struct StartGuard<'a> {
    slot: &'a Mutex<SessionSlot>,
    armed: bool,
}

impl StartGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*slot, SessionSlot::Starting) {
            warn!("Session start abandoned before the engine resolved");
            *slot = SessionSlot::Idle;
        }
    }
}

/// Owns the single scanning session and its observable state.
pub struct SessionManager {
    engine: Arc<dyn DecodeEngine>,
    host: Arc<dyn MediaHost>,
    probe_settings: ProbeSettings,
    state: StateStore,
    slot: Mutex<SessionSlot>,
}

impl SessionManager {
    /// Create a manager with default probe timing.
    #[must_use]
    pub fn new(engine: Arc<dyn DecodeEngine>, host: Arc<dyn MediaHost>) -> Self {
        Self {
            engine,
            host,
            probe_settings: ProbeSettings::default(),
            state: StateStore::new(),
            slot: Mutex::new(SessionSlot::Idle),
        }
    }

    /// Create a manager using the probe timing from `settings`.
    #[must_use]
    pub fn from_settings(
        engine: Arc<dyn DecodeEngine>,
        host: Arc<dyn MediaHost>,
        settings: &ScannerSettings,
    ) -> Self {
        Self::new(engine, host).with_probe_settings(settings.probe.clone())
    }

    /// Override the torch probe timing.
    #[must_use]
    pub fn with_probe_settings(mut self, settings: ProbeSettings) -> Self {
        self.probe_settings = settings;
        self
    }

    /// Whether the host can drive cameras.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.host.is_supported()
    }

    /// Snapshot of the latest committed state.
    #[must_use]
    pub fn state(&self) -> ScannerState {
        self.state.snapshot()
    }

    /// Receiver notified after every committed state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScannerState> {
        self.state.subscribe()
    }

    /// Whether a session is live.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.state.read(|s| s.is_scanning)
    }

    /// List cameras and replace the published camera list.
    ///
    /// Returns an empty list on hosts without camera support.
    pub async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>> {
        if !self.host.is_supported() {
            debug!("Camera enumeration skipped: host has no camera support");
            return Ok(Vec::new());
        }

        match self.engine.enumerate_cameras().await {
            Ok(devices) => {
                let cameras: Vec<CameraDevice> = devices
                    .into_iter()
                    .map(|d| CameraDevice::new(d.id, d.label))
                    .collect();
                debug!("Enumerated {} camera(s)", cameras.len());
                self.state.update(|s| s.available_cameras = cameras.clone());
                Ok(cameras)
            }
            Err(e) => Err(self.record(e.into())),
        }
    }

    /// Start a session rendering into `surface`.
    ///
    /// Binds to `camera`, or the rear-facing hint when `None`. Resolves once
    /// the engine stream is live; the torch probe then runs in the background.
    pub async fn start(
        &self,
        surface: &SurfaceId,
        camera: Option<CameraSelector>,
        config: &ScanConfiguration,
        callbacks: ScanCallbacks,
    ) -> Result<()> {
        if !self.host.is_supported() {
            return Err(SessionError::EnvironmentUnsupported("camera scanning"));
        }

        let guard = {
            let mut slot = self.slot();
            if !matches!(*slot, SessionSlot::Idle) {
                return Err(SessionError::AlreadyScanning);
            }
            *slot = SessionSlot::Starting;
            StartGuard {
                slot: &self.slot,
                armed: true,
            }
        };

        let camera = camera.unwrap_or_default();
        let options = config.resolve();
        let sink = self.decode_sink(callbacks);

        info!(
            "Starting {} on surface {} with {}",
            self.engine.engine_id(),
            surface,
            camera
        );

        let outcome = self.engine.start(surface, &camera, &options, sink).await;
        guard.disarm();

        match outcome {
            Ok(handle) => {
                let token = CancellationToken::new();
                {
                    let mut slot = self.slot();
                    *slot = SessionSlot::Active(ActiveSession {
                        surface: surface.clone(),
                        camera,
                        handle,
                        probe: token.clone(),
                    });
                    self.state.update(|s| {
                        s.is_scanning = true;
                        s.last_error = None;
                        s.is_torch_on = false;
                        s.is_torch_available = false;
                    });
                }

                tokio::spawn(probe::run(
                    Arc::clone(&self.host),
                    surface.clone(),
                    self.probe_settings.clone(),
                    token,
                    self.state.clone(),
                ));

                info!("Session started on surface {}", surface);
                Ok(())
            }
            Err(e) => {
                *self.slot() = SessionSlot::Idle;
                Err(self.record(e.into()))
            }
        }
    }

    /// Stop the live session, if any.
    ///
    /// Local state is always reset, even when the engine fails to stop; the
    /// failure is then recorded and returned.
    pub async fn stop(&self) -> Result<()> {
        let session = {
            let mut slot = self.slot();
            match std::mem::replace(&mut *slot, SessionSlot::Stopping) {
                SessionSlot::Active(session) => session,
                other => {
                    *slot = other;
                    return Ok(());
                }
            }
        };

        session.probe.cancel();
        info!(
            "Stopping session on surface {} ({})",
            session.surface, session.camera
        );

        let outcome = self.engine.stop(session.handle).await;

        let mut slot = self.slot();
        *slot = SessionSlot::Idle;
        self.state.update(|s| {
            s.is_scanning = false;
            s.is_torch_on = false;
            s.is_torch_available = false;
        });
        drop(slot);

        match outcome {
            Ok(()) => {
                info!("Session on surface {} stopped", session.surface);
                Ok(())
            }
            Err(e) => Err(self.record(e.into())),
        }
    }

    /// Decode a still image. Independent of any live session.
    ///
    /// `config` contributes its format filter and verbosity; `None` uses
    /// engine defaults.
    pub async fn scan_static_image(
        &self,
        image: &StaticImage,
        config: Option<&ScanConfiguration>,
    ) -> Result<ScanResult> {
        if !self.host.is_supported() {
            return Err(SessionError::EnvironmentUnsupported("file scanning"));
        }

        let options = config.cloned().unwrap_or_default().static_options();
        debug!("Scanning image {:?}", image);

        match self.engine.scan_static_image(image, &options).await {
            Ok(text) => {
                let result = ScanResult::new(text.clone(), serde_json::Value::String(text));
                self.state.update(|s| {
                    s.last_scan_result = Some(result.clone());
                    s.last_error = None;
                });
                Ok(result)
            }
            Err(e) => Err(self.record(e.into())),
        }
    }

    /// Clear the last result and the last error.
    pub fn clear_results(&self) {
        self.state.update_if(|s| {
            let modified = s.last_scan_result.is_some() || s.last_error.is_some();
            s.last_scan_result = None;
            s.last_error = None;
            modified
        });
    }

    /// Flip the torch on the live session's video track.
    ///
    /// No-op without a session, without camera support, or while the torch
    /// is unavailable. The new torch state is committed only after the host
    /// applied the constraint.
    pub async fn toggle_torch(&self) -> Result<()> {
        if !self.host.is_supported() {
            return Ok(());
        }

        let (surface, session_token) = match &*self.slot() {
            SessionSlot::Active(session) => (session.surface.clone(), session.probe.clone()),
            _ => return Ok(()),
        };

        let (available, on) = self.state.read(|s| (s.is_torch_available, s.is_torch_on));
        if !available {
            debug!("Torch toggle ignored: torch unavailable on {}", surface);
            return Ok(());
        }

        let desired = !on;
        match self
            .host
            .apply_constraints(&surface, &TrackConstraints::torch(desired))
            .await
        {
            Ok(()) => {
                // The session that took the constraint may be gone by now.
                let committed = self.state.update_if(|s| {
                    if session_token.is_cancelled() || !s.is_torch_available {
                        return false;
                    }
                    s.is_torch_on = desired;
                    true
                });
                if committed {
                    debug!("Torch on {} set to {}", surface, desired);
                } else {
                    debug!("Torch change on {} dropped: session ended", surface);
                }
                Ok(())
            }
            Err(e) => Err(self.record(SessionError::TorchFailure(e.to_string()))),
        }
    }

    fn slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode_sink(&self, callbacks: ScanCallbacks) -> DecodeSink {
        let state = self.state.clone();
        let ScanCallbacks {
            on_success,
            on_error,
        } = callbacks;

        DecodeSink::new(
            move |text, payload| {
                let result = ScanResult::new(text, payload);
                state.update(|s| {
                    s.last_scan_result = Some(result.clone());
                    s.last_error = None;
                });
                on_success(result);
            },
            move |message| {
                if let Some(on_error) = &on_error {
                    on_error(DecodeMiss { message });
                }
            },
        )
    }

    /// Record `err` as the current error and hand it back for propagation.
    fn record(&self, err: SessionError) -> SessionError {
        warn!("Scanner error: {}", err);
        let message = err.to_string();
        self.state.update(|s| s.last_error = Some(message));
        err
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("engine", &self.engine.engine_id())
            .field("host_supported", &self.host.is_supported())
            .field("probe_settings", &self.probe_settings)
            .field("state", &self.state.snapshot())
            .finish_non_exhaustive()
    }
}
