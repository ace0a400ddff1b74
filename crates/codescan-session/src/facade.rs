//! Per-surface facade over a shared [`SessionManager`].
//!
//! A facade owns one rendering surface. It reacts to input changes by loading
//! cameras and auto-starting, turns manager results into one-shot
//! [`ScannerEvent`] notifications and stops the session when torn down. After
//! teardown it neither emits events nor touches its display state.

use crate::manager::{ScanCallbacks, SessionManager};
use crate::state::ScannerState;
use codescan_core::{CameraSelector, ScanConfiguration, ScanResult, StaticImage, SurfaceId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Discrete notifications emitted by a facade.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerEvent {
    /// A session started on the facade's surface
    Started,
    /// A stop request completed
    Stopped,
    /// A code was decoded, live or from a file
    ScanSucceeded(ScanResult),
    /// Failure message, including per-frame decode misses
    Failed(String),
}

/// Consumer-controlled inputs.
#[derive(Debug, Clone)]
pub struct FacadeInputs {
    /// Configuration for the next start and for file scans
    pub config: ScanConfiguration,
    /// Explicit camera; takes precedence over the selected camera
    pub camera_id: Option<String>,
    /// Start as soon as the host is capable and no session is live
    pub auto_start: bool,
    /// Show the camera selector; also gates camera enumeration
    pub show_camera_selection: bool,
    /// Show start/stop controls
    pub show_controls: bool,
    /// Extra style class for the rendering container
    pub custom_class: String,
}

impl Default for FacadeInputs {
    fn default() -> Self {
        Self {
            config: ScanConfiguration::default(),
            camera_id: None,
            auto_start: false,
            show_camera_selection: true,
            show_controls: true,
            custom_class: String::new(),
        }
    }
}

/// Facade-local display state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacadeDisplay {
    /// Camera picked through [`ScannerFacade::select_camera`]
    pub selected_camera: Option<String>,
    /// A start is in flight
    pub is_initializing: bool,
}

#[derive(Debug, Clone)]
struct Notifier {
    tx: mpsc::UnboundedSender<ScannerEvent>,
    torn_down: CancellationToken,
}

impl Notifier {
    fn emit(&self, event: ScannerEvent) {
        if self.torn_down.is_cancelled() {
            debug!("Dropping {:?} after teardown", event);
            return;
        }
        // Receiver gone means nobody listens any more
        let _ = self.tx.send(event);
    }
}

/// Binds one surface to a [`SessionManager`].
#[derive(Debug)]
pub struct ScannerFacade {
    manager: Arc<SessionManager>,
    surface: SurfaceId,
    inputs: watch::Sender<FacadeInputs>,
    display: watch::Sender<FacadeDisplay>,
    torn_down: CancellationToken,
    notifier: Notifier,
}

impl ScannerFacade {
    /// Create a facade with a freshly generated surface id.
    ///
    /// Returns the facade and the receiving end of its notifications.
    #[must_use]
    pub fn new(
        manager: Arc<SessionManager>,
        inputs: FacadeInputs,
    ) -> (Self, mpsc::UnboundedReceiver<ScannerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let torn_down = CancellationToken::new();
        let (inputs, _) = watch::channel(inputs);
        let (display, _) = watch::channel(FacadeDisplay::default());

        let facade = Self {
            manager,
            surface: SurfaceId::generate(),
            inputs,
            display,
            notifier: Notifier {
                tx,
                torn_down: torn_down.clone(),
            },
            torn_down,
        };
        debug!("Created scanner facade for surface {}", facade.surface);
        (facade, rx)
    }

    /// Surface this facade renders into.
    #[must_use]
    pub fn surface_id(&self) -> &SurfaceId {
        &self.surface
    }

    /// The shared session manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// Current inputs.
    #[must_use]
    pub fn inputs(&self) -> FacadeInputs {
        self.inputs.borrow().clone()
    }

    /// Current display state.
    #[must_use]
    pub fn display(&self) -> FacadeDisplay {
        self.display.borrow().clone()
    }

    /// Camera picked through the selector, if any.
    #[must_use]
    pub fn selected_camera(&self) -> Option<String> {
        self.display.borrow().selected_camera.clone()
    }

    /// Whether a start is in flight.
    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.display.borrow().is_initializing
    }

    /// Whether [`teardown`](Self::teardown) ran or the facade was dropped.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.is_cancelled()
    }

    /// Latest state published by the manager.
    #[must_use]
    pub fn scanner_state(&self) -> ScannerState {
        self.manager.state()
    }

    /// Initial reaction after the surface is attached.
    pub async fn mount(&self) {
        self.refresh().await;
    }

    /// Replace the inputs and react to them.
    pub async fn set_inputs(&self, inputs: FacadeInputs) {
        if self.is_torn_down() {
            return;
        }
        self.inputs.send_replace(inputs);
        self.refresh().await;
    }

    /// Load cameras when the selector is shown, then auto-start if enabled.
    pub async fn refresh(&self) {
        if self.is_torn_down() || !self.manager.is_supported() {
            return;
        }

        let (show_selection, auto_start) = {
            let inputs = self.inputs.borrow();
            (inputs.show_camera_selection, inputs.auto_start)
        };

        if show_selection {
            if let Err(e) = self.manager.enumerate_cameras().await {
                error!("Failed to load cameras: {}", e);
            }
        }

        if auto_start && !self.manager.is_scanning() {
            self.start_scanning().await;
        }
    }

    /// Start a session on this facade's surface.
    ///
    /// Ignored while a start is already in flight or a session is live.
    pub async fn start_scanning(&self) {
        if self.is_torn_down() || self.manager.is_scanning() {
            return;
        }

        let claimed = self.display.send_if_modified(|d| {
            if d.is_initializing {
                return false;
            }
            d.is_initializing = true;
            true
        });
        if !claimed {
            debug!("Start on {} already in flight", self.surface);
            return;
        }

        let (config, camera_id) = {
            let inputs = self.inputs.borrow();
            (inputs.config.clone(), inputs.camera_id.clone())
        };
        let camera = camera_id
            .or_else(|| self.selected_camera())
            .map(CameraSelector::DeviceId);

        let outcome = self
            .manager
            .start(&self.surface, camera, &config, self.callbacks())
            .await;

        if self.is_torn_down() {
            if outcome.is_ok() {
                debug!("Surface {} detached during start; stopping", self.surface);
                if let Err(e) = self.manager.stop().await {
                    warn!("Stop after teardown failed: {}", e);
                }
            }
            return;
        }

        self.display.send_modify(|d| d.is_initializing = false);
        match outcome {
            Ok(()) => self.notifier.emit(ScannerEvent::Started),
            Err(e) => self.notifier.emit(ScannerEvent::Failed(e.to_string())),
        }
    }

    /// Stop the live session.
    pub async fn stop_scanning(&self) {
        let outcome = self.manager.stop().await;
        if self.is_torn_down() {
            return;
        }
        match outcome {
            Ok(()) => self.notifier.emit(ScannerEvent::Stopped),
            Err(e) => self.notifier.emit(ScannerEvent::Failed(e.to_string())),
        }
    }

    /// Pick a camera; a live session restarts on it.
    pub async fn select_camera(&self, camera_id: impl Into<String>) {
        if self.is_torn_down() {
            return;
        }
        let camera_id = camera_id.into();
        self.display.send_modify(|d| d.selected_camera = Some(camera_id));

        if self.manager.is_scanning() {
            self.stop_scanning().await;
            self.start_scanning().await;
        }
    }

    /// Flip the torch; failures become [`ScannerEvent::Failed`].
    pub async fn toggle_torch(&self) {
        if let Err(e) = self.manager.toggle_torch().await {
            self.notifier.emit(ScannerEvent::Failed(e.to_string()));
        }
    }

    /// Decode a still image using the current configuration.
    pub async fn scan_file(&self, image: &StaticImage) -> Option<ScanResult> {
        let config = self.inputs.borrow().config.clone();
        match self.manager.scan_static_image(image, Some(&config)).await {
            Ok(result) => {
                self.notifier.emit(ScannerEvent::ScanSucceeded(result.clone()));
                Some(result)
            }
            Err(e) => {
                self.notifier.emit(ScannerEvent::Failed(e.to_string()));
                None
            }
        }
    }

    /// Detach the surface and stop the session. Runs once.
    pub async fn teardown(&self) {
        if self.torn_down.is_cancelled() {
            return;
        }
        self.torn_down.cancel();
        debug!("Tearing down scanner facade for surface {}", self.surface);

        if let Err(e) = self.manager.stop().await {
            debug!("Teardown stop failed: {}", e);
        }
    }

    fn callbacks(&self) -> ScanCallbacks {
        let on_success = self.notifier.clone();
        let on_miss = self.notifier.clone();
        ScanCallbacks::new(move |result| on_success.emit(ScannerEvent::ScanSucceeded(result)))
            .with_error(move |miss| on_miss.emit(ScannerEvent::Failed(miss.message)))
    }
}

impl Drop for ScannerFacade {
    fn drop(&mut self) {
        if self.torn_down.is_cancelled() {
            return;
        }
        self.torn_down.cancel();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let manager = Arc::clone(&self.manager);
                let surface = self.surface.clone();
                handle.spawn(async move {
                    if let Err(e) = manager.stop().await {
                        debug!("Stop for dropped surface {} failed: {}", surface, e);
                    }
                });
            }
            Err(_) => warn!(
                "Scanner facade for {} dropped outside a runtime; session left running",
                self.surface
            ),
        }
    }
}
