//! Scanner configuration.
//!
//! [`ScanConfiguration`] is the per-session record a consumer hands to the
//! scanner; every field is optional and defaults are applied when a session
//! starts. [`ScannerSettings`] holds process-level tuning (probe timing and a
//! default scan configuration) loaded from TOML with environment overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::BarcodeFormat;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Frame rate used when the configuration leaves `fps` unset.
pub const DEFAULT_FPS: u32 = 10;

/// Detection box edge used when the configuration leaves `qrbox` unset.
pub const DEFAULT_BOX_SIZE: u32 = 250;

/// Size of the region the engine scans for codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectionBox {
    /// Square region with the given edge length
    Square(u32),
    /// Explicit width and height
    Dimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
}

impl Default for DetectionBox {
    fn default() -> Self {
        Self::Square(DEFAULT_BOX_SIZE)
    }
}

/// Per-session scanner configuration. No field is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfiguration {
    /// Frames per second to decode (default: 10)
    pub fps: Option<u32>,
    /// Detection box (default: 250 square)
    pub qrbox: Option<DetectionBox>,
    /// Accepted symbologies (default: engine default)
    pub formats_to_support: Option<Vec<BarcodeFormat>>,
    /// Verbose engine logging for static scans
    pub verbose: Option<bool>,
    /// Aspect ratio for the video
    pub aspect_ratio: Option<f64>,
    /// Disable mirrored-frame decoding (default: false)
    pub disable_flip: Option<bool>,
    /// Raw media constraints passed through to the host
    pub video_constraints: Option<serde_json::Value>,
    /// Show the engine's torch button if supported (default: false)
    pub show_torch_button_if_supported: Option<bool>,
}

impl ScanConfiguration {
    /// Apply defaults and produce the options handed to the engine's `start`.
    #[must_use]
    pub fn resolve(&self) -> CameraScanOptions {
        CameraScanOptions {
            fps: self.fps.unwrap_or(DEFAULT_FPS),
            qrbox: self.qrbox.unwrap_or_default(),
            aspect_ratio: self.aspect_ratio,
            disable_flip: self.disable_flip.unwrap_or(false),
            video_constraints: self.video_constraints.clone(),
            show_torch_button_if_supported: self.show_torch_button_if_supported.unwrap_or(false),
            formats_to_support: self.formats_to_support.clone(),
        }
    }

    /// Options for decoding a single still image.
    #[must_use]
    pub fn static_options(&self) -> StaticScanOptions {
        StaticScanOptions {
            formats_to_support: self.formats_to_support.clone(),
            verbose: self.verbose.unwrap_or(false),
        }
    }
}

/// Fully resolved options for a live camera session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraScanOptions {
    /// Frames per second
    pub fps: u32,
    /// Detection box
    pub qrbox: DetectionBox,
    /// Aspect ratio, if requested
    pub aspect_ratio: Option<f64>,
    /// Whether mirrored decoding is disabled
    pub disable_flip: bool,
    /// Raw media constraints
    pub video_constraints: Option<serde_json::Value>,
    /// Torch button visibility hint
    pub show_torch_button_if_supported: bool,
    /// Format filter; `None` leaves the engine default
    pub formats_to_support: Option<Vec<BarcodeFormat>>,
}

/// Options for static image decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticScanOptions {
    /// Format filter; `None` leaves the engine default
    pub formats_to_support: Option<Vec<BarcodeFormat>>,
    /// Verbose engine logging
    pub verbose: bool,
}

/// Process-level scanner settings.
///
/// Loaded from `~/.config/codescan/config.toml` (or platform equivalent).
/// Missing files and missing keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Torch capability probe timing
    pub probe: ProbeSettings,
    /// Scan configuration used when a consumer does not provide one
    pub scan: ScanConfiguration,
}

impl ScannerSettings {
    /// Load settings from the XDG config path, falling back to defaults.
    ///
    /// # Errors
    /// Returns error if the config directory cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Settings file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load settings from an explicit TOML file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading settings from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings with environment variable overrides.
    ///
    /// Supports:
    /// - `CODESCAN_SETTLE_DELAY_MS`
    /// - `CODESCAN_PROBE_INTERVAL_MS`
    /// - `CODESCAN_PROBE_MAX_ATTEMPTS`
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut settings = Self::load()?;
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = lookup("CODESCAN_SETTLE_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.probe.settle_delay_ms = ms;
            tracing::debug!("Override probe.settle_delay_ms from env: {}", ms);
        }

        if let Some(ms) = lookup("CODESCAN_PROBE_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.probe.interval_ms = ms;
            tracing::debug!("Override probe.interval_ms from env: {}", ms);
        }

        if let Some(attempts) = lookup("CODESCAN_PROBE_MAX_ATTEMPTS").and_then(|v| v.parse().ok())
        {
            self.probe.max_attempts = attempts;
            tracing::debug!("Override probe.max_attempts from env: {}", attempts);
        }
    }

    /// Reject settings the probe cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probe.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.probe.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.max_attempts".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.scan.fps == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "scan.fps".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Path to the settings file: `~/.config/codescan/config.toml`.
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "codescan", "codescan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Timing of the torch capability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Warm-up delay before the first poll, in milliseconds
    pub settle_delay_ms: u64,
    /// Delay between polls, in milliseconds
    pub interval_ms: u64,
    /// Poll attempts before giving up
    pub max_attempts: u32,
}

impl ProbeSettings {
    /// Warm-up delay as a `Duration`.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Poll interval as a `Duration`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
            interval_ms: 300,
            max_attempts: 15,
        }
    }
}
