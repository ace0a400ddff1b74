use thiserror::Error;

/// Failures surfaced by session operations.
///
/// Per-frame decode misses are not errors; they reach the caller's error
/// callback as [`codescan_core::DecodeMiss`] values and are never recorded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0} is only available in a camera-capable environment")]
    EnvironmentUnsupported(&'static str),

    #[error("scanner is already running")]
    AlreadyScanning,

    #[error("{0}")]
    EngineFailure(String),

    #[error("failed to toggle torch")]
    TorchFailure(String),
}

impl SessionError {
    /// Whether the caller may retry the same operation after fixing the cause.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::EngineFailure(_) | Self::TorchFailure(_))
    }
}

impl From<codescan_engine::EngineError> for SessionError {
    fn from(err: codescan_engine::EngineError) -> Self {
        Self::EngineFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
