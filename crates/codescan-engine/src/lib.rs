//! Codescan Engine - Seams to the external decoding engine and host media layer.
//!
//! The session crate drives these traits; concrete engines (a WebAssembly
//! bridge, a native camera stack, test doubles) implement them.
//!
//! # Modules
//!
//! - [`engine`] - The [`DecodeEngine`] contract and the per-frame [`DecodeSink`]
//! - [`media`] - The [`MediaHost`] contract for track lookup and torch constraints
//! - [`error`] - [`EngineError`] reported across both seams
//!
//! # Example
//!
//! ```rust
//! use codescan_engine::{HeadlessHost, MediaHost, TrackConstraints};
//!
//! let host = HeadlessHost;
//! assert!(!host.is_supported());
//! assert_eq!(TrackConstraints::torch(true).torch, Some(true));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod engine;
pub mod error;
pub mod media;

// Re-export commonly used types
pub use engine::{DecodeEngine, DecodeSink, EngineHandle};
pub use error::{EngineError, Result};
pub use media::{HeadlessHost, MediaHost, TrackCapabilities, TrackConstraints, TrackStatus};
