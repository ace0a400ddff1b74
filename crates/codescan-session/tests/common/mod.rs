#![allow(dead_code)]

use async_trait::async_trait;
use codescan_core::{
    CameraDevice, CameraScanOptions, CameraSelector, ProbeSettings, StaticImage,
    StaticScanOptions, SurfaceId,
};
use codescan_engine::{
    DecodeEngine, DecodeSink, EngineError, EngineHandle, MediaHost, Result, TrackCapabilities,
    TrackConstraints, TrackStatus,
};
use codescan_session::{ScannerEvent, SessionManager};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Engine and host calls in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enumerate,
    Start {
        surface: SurfaceId,
        camera: CameraSelector,
        options: CameraScanOptions,
    },
    Stop(EngineHandle),
    ScanStatic {
        name: String,
        options: StaticScanOptions,
    },
    Apply {
        surface: SurfaceId,
        constraints: TrackConstraints,
    },
}

#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

impl CallLog {
    pub fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn starts(&self) -> Vec<CameraSelector> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start { camera, .. } => Some(camera),
                _ => None,
            })
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Stop(_)))
            .count()
    }

    pub fn applied(&self) -> Vec<TrackConstraints> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Apply { constraints, .. } => Some(constraints),
                _ => None,
            })
            .collect()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }
}

pub struct MockEngine {
    log: Arc<CallLog>,
    cameras: Mutex<Vec<CameraDevice>>,
    enumeration_failure: Mutex<Option<String>>,
    start_failure: Mutex<Option<String>>,
    stop_failure: Mutex<Option<String>>,
    static_result: Mutex<std::result::Result<String, String>>,
    start_delay: Mutex<Option<Duration>>,
    sink: Mutex<Option<DecodeSink>>,
    next_handle: AtomicU64,
}

impl MockEngine {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            cameras: Mutex::new(vec![
                CameraDevice::new("cam-1", "Back Camera"),
                CameraDevice::new("cam-2", "Front Camera"),
            ]),
            enumeration_failure: Mutex::new(None),
            start_failure: Mutex::new(None),
            stop_failure: Mutex::new(None),
            static_result: Mutex::new(Ok("static-code".to_string())),
            start_delay: Mutex::new(None),
            sink: Mutex::new(None),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn set_cameras(&self, cameras: Vec<CameraDevice>) {
        *self.cameras.lock().unwrap() = cameras;
    }

    pub fn fail_enumeration(&self, message: &str) {
        *self.enumeration_failure.lock().unwrap() = Some(message.to_string());
    }

    /// Fail the next start with `message`.
    pub fn fail_next_start(&self, message: &str) {
        *self.start_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_stops(&self, message: &str) {
        *self.stop_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_static_result(&self, result: std::result::Result<&str, &str>) {
        *self.static_result.lock().unwrap() = result.map(str::to_string).map_err(str::to_string);
    }

    pub fn set_start_delay(&self, delay: Duration) {
        *self.start_delay.lock().unwrap() = Some(delay);
    }

    /// Sink handed over by the most recent successful start.
    pub fn sink(&self) -> DecodeSink {
        self.sink.lock().unwrap().clone().expect("engine started")
    }
}

#[async_trait]
impl DecodeEngine for MockEngine {
    async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>> {
        self.log.push(Call::Enumerate);
        if let Some(message) = self.enumeration_failure.lock().unwrap().clone() {
            return Err(EngineError::Rejected(message));
        }
        Ok(self.cameras.lock().unwrap().clone())
    }

    async fn start(
        &self,
        surface: &SurfaceId,
        camera: &CameraSelector,
        options: &CameraScanOptions,
        sink: DecodeSink,
    ) -> Result<EngineHandle> {
        let delay = *self.start_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.log.push(Call::Start {
            surface: surface.clone(),
            camera: camera.clone(),
            options: options.clone(),
        });

        if let Some(message) = self.start_failure.lock().unwrap().take() {
            return Err(EngineError::Rejected(message));
        }

        *self.sink.lock().unwrap() = Some(sink);
        Ok(EngineHandle::new(
            self.next_handle.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn stop(&self, handle: EngineHandle) -> Result<()> {
        self.log.push(Call::Stop(handle));
        self.sink.lock().unwrap().take();
        match self.stop_failure.lock().unwrap().clone() {
            Some(message) => Err(EngineError::Rejected(message)),
            None => Ok(()),
        }
    }

    async fn scan_static_image(
        &self,
        image: &StaticImage,
        options: &StaticScanOptions,
    ) -> Result<String> {
        self.log.push(Call::ScanStatic {
            name: image.name.clone(),
            options: options.clone(),
        });
        self.static_result
            .lock()
            .unwrap()
            .clone()
            .map_err(EngineError::Rejected)
    }

    fn engine_id(&self) -> &str {
        "mock"
    }
}

pub struct MockHost {
    log: Arc<CallLog>,
    supported: bool,
    status: Mutex<TrackStatus>,
    apply_failure: Mutex<Option<String>>,
    apply_delay: Mutex<Option<Duration>>,
    polls: AtomicU32,
}

impl MockHost {
    pub fn new(log: Arc<CallLog>, supported: bool) -> Self {
        Self {
            log,
            supported,
            status: Mutex::new(TrackStatus::NoVideoElement),
            apply_failure: Mutex::new(None),
            apply_delay: Mutex::new(None),
            polls: AtomicU32::new(0),
        }
    }

    pub fn set_status(&self, status: TrackStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn set_torch(&self, torch: Option<bool>) {
        self.set_status(TrackStatus::Ready(TrackCapabilities { torch }));
    }

    pub fn fail_applies(&self, message: &str) {
        *self.apply_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_apply_delay(&self, delay: Duration) {
        *self.apply_delay.lock().unwrap() = Some(delay);
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaHost for MockHost {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn track_status(&self, _surface: &SurfaceId) -> TrackStatus {
        self.polls.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap()
    }

    async fn apply_constraints(
        &self,
        surface: &SurfaceId,
        constraints: &TrackConstraints,
    ) -> Result<()> {
        let delay = *self.apply_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push(Call::Apply {
            surface: surface.clone(),
            constraints: *constraints,
        });
        match self.apply_failure.lock().unwrap().clone() {
            Some(message) => Err(EngineError::Media(message)),
            None => Ok(()),
        }
    }
}

pub struct Harness {
    pub log: Arc<CallLog>,
    pub engine: Arc<MockEngine>,
    pub host: Arc<MockHost>,
    pub manager: Arc<SessionManager>,
}

pub fn harness() -> Harness {
    harness_with(true)
}

pub fn headless_harness() -> Harness {
    harness_with(false)
}

fn harness_with(supported: bool) -> Harness {
    let log = Arc::new(CallLog::default());
    let engine = Arc::new(MockEngine::new(Arc::clone(&log)));
    let host = Arc::new(MockHost::new(Arc::clone(&log), supported));
    let manager = Arc::new(
        SessionManager::new(engine.clone(), host.clone())
            .with_probe_settings(ProbeSettings::default()),
    );
    Harness {
        log,
        engine,
        host,
        manager,
    }
}

pub fn surface(id: &str) -> SurfaceId {
    SurfaceId::new(id).expect("valid surface id")
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<ScannerEvent>) -> Vec<ScannerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Let spawned tasks run without moving the paused clock far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
