//! Host media seam: video track lookup and constraint application.

use crate::error::{EngineError, Result};
use async_trait::async_trait;
use codescan_core::SurfaceId;
use serde::Serialize;

/// Capabilities reported by a live video track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackCapabilities {
    /// Torch support; `None` when the track does not report it at all
    pub torch: Option<bool>,
}

impl TrackCapabilities {
    /// Whether the track reports torch support.
    #[must_use]
    pub fn supports_torch(&self) -> bool {
        self.torch.unwrap_or(false)
    }
}

/// What the host currently renders for a surface.
///
/// Variants follow the lookup chain: element, then stream, then track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// No video element rendered for the surface yet
    NoVideoElement,
    /// Video element present without an attached media stream
    NoMediaStream,
    /// Stream present without a video track
    NoVideoTrack,
    /// A video track is live
    Ready(TrackCapabilities),
}

/// Constraints applied to a live video track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackConstraints {
    /// Torch on/off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torch: Option<bool>,
}

impl TrackConstraints {
    /// Constraint set switching the torch on or off.
    #[must_use]
    pub fn torch(on: bool) -> Self {
        Self { torch: Some(on) }
    }
}

/// Contract of the host media environment.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Whether this host can drive cameras at all.
    fn is_supported(&self) -> bool;

    /// Look up the video track rendered into `surface`.
    async fn track_status(&self, surface: &SurfaceId) -> TrackStatus;

    /// Apply `constraints` to the video track rendered into `surface`.
    async fn apply_constraints(
        &self,
        surface: &SurfaceId,
        constraints: &TrackConstraints,
    ) -> Result<()>;
}

/// Host without camera capability, e.g. a server or CLI process.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessHost;

#[async_trait]
impl MediaHost for HeadlessHost {
    fn is_supported(&self) -> bool {
        false
    }

    async fn track_status(&self, _surface: &SurfaceId) -> TrackStatus {
        TrackStatus::NoVideoElement
    }

    async fn apply_constraints(
        &self,
        surface: &SurfaceId,
        _constraints: &TrackConstraints,
    ) -> Result<()> {
        Err(EngineError::Unsupported(format!(
            "no video track for surface {surface}"
        )))
    }
}
