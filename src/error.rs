//! Crate-wide error types

use thiserror::Error;

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RelayError>;

/// Top-level error type for relay operations
///
/// Protocol-level problems (malformed messages, unknown types, messages in
/// the wrong state) are deliberately *not* represented here: the relay logs
/// and ignores them without erroring the connection. These variants cover
/// transport and setup failures only.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Underlying socket I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or framing failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Invalid server configuration (bad bind address, unparsable port)
    #[error("invalid configuration: {0}")]
    Config(String),
}
