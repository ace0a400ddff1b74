//! Simulated decoding engine and camera host.
//!
//! The engine "sees" a fixed rotation of codes, decoding one every few
//! frames and reporting a miss for the rest. The host exposes a torch once
//! the video track has had a few polls to come up.

use async_trait::async_trait;
use codescan_core::{
    CameraDevice, CameraScanOptions, CameraSelector, StaticImage, StaticScanOptions, SurfaceId,
};
use codescan_engine::{
    DecodeEngine, DecodeSink, EngineError, EngineHandle, MediaHost, Result, TrackCapabilities,
    TrackConstraints, TrackStatus,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const MISS_MESSAGE: &str = "No barcode or QR code detected.";
const STATIC_MISS_MESSAGE: &str = "No MultiFormat Readers were able to detect the code.";

/// Frames between successful decodes.
const FRAMES_PER_DECODE: u64 = 3;

pub struct SimulatedEngine {
    cameras: Vec<CameraDevice>,
    codes: Vec<String>,
    next_handle: AtomicU64,
    sessions: Mutex<HashMap<EngineHandle, JoinHandle<()>>>,
}

impl SimulatedEngine {
    pub fn new(codes: Vec<String>) -> Self {
        Self {
            cameras: vec![
                CameraDevice::new("cam-back", "Back Camera"),
                CameraDevice::new("cam-front", ""),
            ],
            codes,
            next_handle: AtomicU64::new(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<EngineHandle, JoinHandle<()>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DecodeEngine for SimulatedEngine {
    async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>> {
        Ok(self.cameras.clone())
    }

    async fn start(
        &self,
        surface: &SurfaceId,
        camera: &CameraSelector,
        options: &CameraScanOptions,
        sink: DecodeSink,
    ) -> Result<EngineHandle> {
        if let CameraSelector::DeviceId(id) = camera {
            if !self.cameras.iter().any(|c| &c.id == id) {
                return Err(EngineError::Rejected(format!(
                    "Requested device not found: {id}"
                )));
            }
        }

        let handle = EngineHandle::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let frame = Duration::from_millis(1000 / u64::from(options.fps.max(1)));
        let codes = self.codes.clone();
        let camera_label = camera.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            let mut frames = 0u64;
            let mut decoded = 0usize;
            loop {
                ticker.tick().await;
                frames += 1;
                if codes.is_empty() || frames % FRAMES_PER_DECODE != 0 {
                    sink.missed(MISS_MESSAGE);
                    continue;
                }
                let text = &codes[decoded % codes.len()];
                decoded += 1;
                sink.decoded(
                    text.clone(),
                    json!({
                        "decodedText": text,
                        "camera": camera_label,
                        "frame": frames,
                    }),
                );
            }
        });

        self.sessions().insert(handle, task);
        info!("Simulated stream {} live on {}", handle.id(), surface);
        Ok(handle)
    }

    async fn stop(&self, handle: EngineHandle) -> Result<()> {
        match self.sessions().remove(&handle) {
            Some(task) => {
                task.abort();
                debug!("Simulated stream {} stopped", handle.id());
                Ok(())
            }
            None => Err(EngineError::Rejected(
                "Cannot stop, scanner is not running or paused.".to_string(),
            )),
        }
    }

    async fn scan_static_image(
        &self,
        image: &StaticImage,
        options: &StaticScanOptions,
    ) -> Result<String> {
        if options.verbose {
            debug!("Decoding {} ({} bytes)", image.name, image.bytes.len());
        }
        match std::str::from_utf8(&image.bytes) {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(EngineError::Rejected(STATIC_MISS_MESSAGE.to_string())),
        }
    }

    fn engine_id(&self) -> &str {
        "simulated"
    }
}

pub struct SimulatedHost {
    ready_after: u32,
    polls: AtomicU32,
}

impl SimulatedHost {
    /// Host whose video track appears after `ready_after` polls.
    pub fn new(ready_after: u32) -> Self {
        Self {
            ready_after,
            polls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl MediaHost for SimulatedHost {
    fn is_supported(&self) -> bool {
        true
    }

    async fn track_status(&self, _surface: &SurfaceId) -> TrackStatus {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if poll < self.ready_after {
            TrackStatus::NoVideoTrack
        } else {
            TrackStatus::Ready(TrackCapabilities { torch: Some(true) })
        }
    }

    async fn apply_constraints(
        &self,
        surface: &SurfaceId,
        constraints: &TrackConstraints,
    ) -> Result<()> {
        info!("Applied {:?} to {}", constraints, surface);
        Ok(())
    }
}
