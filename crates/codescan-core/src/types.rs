//! Shared types used across codescan.
//!
//! Newtypes and enums for surfaces, cameras, symbologies and decode results.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the rendering area a scanner session draws into.
///
/// Surface IDs are non-empty and limited to ASCII alphanumerics, `-` and `_`
/// so they can be used as element ids by any host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(String);

impl SurfaceId {
    /// Create a `SurfaceId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains unsupported characters.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh surface id of the form `scanner-<uuid>`.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("scanner-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), CoreError> {
        if id.is_empty() {
            return Err(CoreError::Validation(
                "invalid surface ID: must not be empty".to_string(),
            ));
        }

        if id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid surface ID: only ASCII alphanumerics, '-' and '_' allowed, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optical code symbologies understood by the decoding engine.
///
/// The numeric codes are stable and shared with engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum BarcodeFormat {
    /// QR code
    QrCode = 0,
    /// Aztec
    Aztec = 1,
    /// Codabar
    Codabar = 2,
    /// Code 39
    #[serde(rename = "CODE_39")]
    Code39 = 3,
    /// Code 93
    #[serde(rename = "CODE_93")]
    Code93 = 4,
    /// Code 128
    #[serde(rename = "CODE_128")]
    Code128 = 5,
    /// Data Matrix
    DataMatrix = 6,
    /// MaxiCode
    Maxicode = 7,
    /// Interleaved 2 of 5
    Itf = 8,
    /// EAN-13
    #[serde(rename = "EAN_13")]
    Ean13 = 9,
    /// EAN-8
    #[serde(rename = "EAN_8")]
    Ean8 = 10,
    /// PDF417
    #[serde(rename = "PDF_417")]
    Pdf417 = 11,
    /// GS1 DataBar (RSS-14)
    #[serde(rename = "RSS_14")]
    Rss14 = 12,
    /// GS1 DataBar Expanded
    RssExpanded = 13,
    /// UPC-A
    UpcA = 14,
    /// UPC-E
    UpcE = 15,
    /// UPC/EAN extension
    UpcEanExtension = 16,
}

impl BarcodeFormat {
    /// Every supported format, ordered by code.
    pub const ALL: [BarcodeFormat; 17] = [
        Self::QrCode,
        Self::Aztec,
        Self::Codabar,
        Self::Code39,
        Self::Code93,
        Self::Code128,
        Self::DataMatrix,
        Self::Maxicode,
        Self::Itf,
        Self::Ean13,
        Self::Ean8,
        Self::Pdf417,
        Self::Rss14,
        Self::RssExpanded,
        Self::UpcA,
        Self::UpcE,
        Self::UpcEanExtension,
    ];

    /// Numeric code used by the engine.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Check if this is a two-dimensional symbology.
    #[must_use]
    pub fn is_2d(self) -> bool {
        matches!(
            self,
            Self::QrCode | Self::Aztec | Self::DataMatrix | Self::Maxicode | Self::Pdf417
        )
    }
}

impl TryFrom<u8> for BarcodeFormat {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| CoreError::Validation(format!("unknown barcode format code {code}")))
    }
}

/// Logical camera request used when no device id is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear-facing camera
    #[default]
    Environment,
    /// Front-facing camera
    User,
}

/// Which camera a session binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSelector {
    /// A specific device from camera enumeration
    DeviceId(String),
    /// A facing-mode hint resolved by the host
    Facing(FacingMode),
}

impl CameraSelector {
    /// The rear-facing hint used when the caller does not pick a camera.
    #[must_use]
    pub fn rear() -> Self {
        Self::Facing(FacingMode::Environment)
    }
}

impl Default for CameraSelector {
    fn default() -> Self {
        Self::rear()
    }
}

impl From<&str> for CameraSelector {
    fn from(id: &str) -> Self {
        Self::DeviceId(id.to_string())
    }
}

impl fmt::Display for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceId(id) => write!(f, "device:{id}"),
            Self::Facing(FacingMode::Environment) => write!(f, "facing:environment"),
            Self::Facing(FacingMode::User) => write!(f, "facing:user"),
        }
    }
}

/// A camera reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    /// Device identifier
    pub id: String,
    /// Human-readable label
    pub label: String,
}

impl CameraDevice {
    /// Build a device, synthesizing `Camera <id>` when the label is empty.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let label = label.into();
        let label = if label.trim().is_empty() {
            format!("Camera {id}")
        } else {
            label
        };
        Self { id, label }
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Decoded text from the scanned code
    pub decoded_text: String,
    /// Engine-specific result payload
    pub result: serde_json::Value,
}

impl ScanResult {
    /// Create a result from decoded text and the engine payload.
    #[must_use]
    pub fn new(decoded_text: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            decoded_text: decoded_text.into(),
            result,
        }
    }
}

/// A per-frame decode failure. Expected noise, never a session error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeMiss {
    /// Engine message for the frame
    pub message: String,
}

impl fmt::Display for DecodeMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An image file handed to static scanning.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticImage {
    /// File name, used only for logging
    pub name: String,
    /// Encoded image bytes
    pub bytes: Vec<u8>,
}

impl StaticImage {
    /// Wrap raw image bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl fmt::Debug for StaticImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticImage")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
