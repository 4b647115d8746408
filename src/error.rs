//! Error types for the chat relay

use thiserror::Error;

/// Main error type for relay operations
///
/// Every per-connection failure is contained to that connection's worker
/// task; none of these variants ever terminates the accept loop or affects
/// other sessions.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The byte stream could not be parsed into frames
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// The peer violated the protocol at a point where the connection
    /// must be closed (pre-admission handshake)
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// I/O failure on the transport
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Errors produced by the frame codec
///
/// All framing errors are fatal for the connection that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// A frame exceeded the configured size ceiling
    #[error("Frame too long: {len} bytes (max: {max} bytes)")]
    FrameTooLong {
        /// Bytes buffered for the offending frame
        len: usize,
        /// Configured frame-size ceiling
        max: usize,
    },

    /// The transport closed in the middle of a frame
    #[error("Transport closed mid-frame")]
    TruncatedFrame,

    /// A backslash escape was followed by an unrecognized character
    #[error("Invalid escape sequence: \\{0}")]
    InvalidEscape(char),

    /// A frame contained bytes that are not valid UTF-8
    #[error("Frame is not valid UTF-8")]
    InvalidUtf8,
}

/// Protocol-level violations that close the connection
///
/// Post-admission violations are answered in-band with `ERROR` or `REJECTED`
/// events and never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The first frame of a connection was not a CONNECT command
    #[error("Handshake requires CONNECT, got {got:?}")]
    HandshakeRequired {
        /// Tag of the frame that was received instead
        got: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RelayError>;
