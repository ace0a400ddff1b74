//! Decoding engine contract.

use crate::error::Result;
use async_trait::async_trait;
use codescan_core::{
    CameraDevice, CameraScanOptions, CameraSelector, StaticImage, StaticScanOptions, SurfaceId,
};
use std::fmt;
use std::sync::Arc;

/// Opaque token for a running engine instance, returned by [`DecodeEngine::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(u64);

impl EngineHandle {
    /// Wrap an engine-assigned instance id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The engine-assigned instance id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0
    }
}

type DecodeFn = dyn Fn(String, serde_json::Value) + Send + Sync;
type MissFn = dyn Fn(String) + Send + Sync;

/// Where a running engine reports per-frame outcomes.
///
/// Engines call [`decoded`](Self::decoded) for every recognised code and
/// [`missed`](Self::missed) for every frame without one. Both run
/// synchronously on the engine's calling thread.
#[derive(Clone)]
pub struct DecodeSink {
    on_decode: Arc<DecodeFn>,
    on_miss: Arc<MissFn>,
}

impl DecodeSink {
    /// Build a sink from the two frame callbacks.
    #[must_use]
    pub fn new<D, M>(on_decode: D, on_miss: M) -> Self
    where
        D: Fn(String, serde_json::Value) + Send + Sync + 'static,
        M: Fn(String) + Send + Sync + 'static,
    {
        Self {
            on_decode: Arc::new(on_decode),
            on_miss: Arc::new(on_miss),
        }
    }

    /// Report a decoded code with the engine's result payload.
    pub fn decoded(&self, text: impl Into<String>, payload: serde_json::Value) {
        (self.on_decode)(text.into(), payload);
    }

    /// Report a frame in which no code was found.
    pub fn missed(&self, message: impl Into<String>) {
        (self.on_miss)(message.into());
    }
}

impl fmt::Debug for DecodeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeSink").finish_non_exhaustive()
    }
}

/// Contract of the external optical-code decoding engine.
///
/// The engine owns frame capture and symbol decoding; the session layer only
/// opens, closes and listens to it. Implementations must be thread-safe.
#[async_trait]
pub trait DecodeEngine: Send + Sync {
    /// List the cameras the engine can bind to. Labels may be empty.
    async fn enumerate_cameras(&self) -> Result<Vec<CameraDevice>>;

    /// Open a camera stream rendered into `surface` and start decoding.
    ///
    /// Resolves once the stream is live. Decode outcomes are reported
    /// through `sink` until [`stop`](Self::stop) is called.
    async fn start(
        &self,
        surface: &SurfaceId,
        camera: &CameraSelector,
        options: &CameraScanOptions,
        sink: DecodeSink,
    ) -> Result<EngineHandle>;

    /// Halt decoding and release the camera and rendering resources.
    async fn stop(&self, handle: EngineHandle) -> Result<()>;

    /// Decode a single still image, returning the decoded text.
    async fn scan_static_image(
        &self,
        image: &StaticImage,
        options: &StaticScanOptions,
    ) -> Result<String>;

    /// Identifier used in logs.
    fn engine_id(&self) -> &str;
}
