//! Error types shared by the engine and media seams.

use thiserror::Error;

/// Result alias for engine and host operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures reported by a decoding engine or the host media layer.
///
/// `Rejected` carries the engine's own message untouched so callers can
/// surface it verbatim.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine refused the request
    #[error("{0}")]
    Rejected(String),

    /// The host media layer failed
    #[error("media error: {0}")]
    Media(String),

    /// The host lacks the requested capability
    #[error("not supported by host: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_is_verbatim() {
        let err = EngineError::Rejected("NotAllowedError: Permission denied".to_string());
        assert_eq!(err.to_string(), "NotAllowedError: Permission denied");
    }

    #[test]
    fn test_media_error_display() {
        let err = EngineError::Media("track ended".to_string());
        assert_eq!(err.to_string(), "media error: track ended");
    }
}
