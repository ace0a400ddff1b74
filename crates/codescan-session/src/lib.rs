//! Codescan Session - Live scanning session management.
//!
//! This crate owns the lifecycle of a single camera scanning session on top of
//! the [`codescan_engine`] seams. It publishes an observable [`ScannerState`],
//! probes the active video track for torch support and binds rendering
//! surfaces to the session through [`ScannerFacade`].
//!
//! # Features
//!
//! - At most one live session per [`SessionManager`], guarded against
//!   concurrent starts
//! - Multi-field state transitions committed atomically through a watch channel
//! - Bounded, cancellable torch capability probe
//! - Per-surface facade with one-shot notifications and teardown on drop
//!
//! # Example
//!
//! ```rust,ignore
//! use codescan_session::{FacadeInputs, ScannerFacade, SessionManager};
//! use std::sync::Arc;
//!
//! let manager = Arc::new(SessionManager::new(engine, host));
//! let (facade, mut events) = ScannerFacade::new(
//!     Arc::clone(&manager),
//!     FacadeInputs { auto_start: true, ..Default::default() },
//! );
//!
//! facade.mount().await;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod facade;
pub mod manager;
pub mod probe;
pub mod state;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use facade::{FacadeDisplay, FacadeInputs, ScannerEvent, ScannerFacade};
pub use manager::{ScanCallbacks, SessionManager};
pub use probe::{CapabilityProbe, ProbeStep};
pub use state::{ScannerState, StateStore};
