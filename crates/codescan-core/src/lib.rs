//! Codescan Core - Foundation crate for the codescan scanner workspace.
//!
//! This crate provides the shared types, error handling and configuration
//! that the engine and session crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - Per-session [`ScanConfiguration`] and TOML-backed [`ScannerSettings`]
//! - [`types`] - Shared newtypes and enums (`SurfaceId`, `CameraSelector`, `BarcodeFormat`, `ScanResult`)
//!
//! # Example
//!
//! ```rust
//! use codescan_core::{BarcodeFormat, ScanConfiguration};
//!
//! let config = ScanConfiguration {
//!     formats_to_support: Some(vec![BarcodeFormat::QrCode]),
//!     ..Default::default()
//! };
//! let options = config.resolve();
//! assert_eq!(options.fps, 10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    CameraScanOptions, DetectionBox, ProbeSettings, ScanConfiguration, ScannerSettings,
    StaticScanOptions,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{
    BarcodeFormat, CameraDevice, CameraSelector, DecodeMiss, FacingMode, ScanResult, StaticImage,
    SurfaceId,
};
