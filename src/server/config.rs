//! Relay configuration
//!
//! The whole configuration surface: listen address, the SAY payload cap and
//! the frame-size ceiling. There are no CLI flags, config files or
//! environment variables beyond this struct.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Default listen port
pub const DEFAULT_PORT: u16 = 9000;

/// Default maximum SAY payload length, in characters
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 200;

/// Default maximum frame length, in bytes (terminator excluded)
///
/// Caps the decoder's accumulation buffer so a peer that never sends a
/// terminator cannot grow it without bound.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

/// Configuration for a [`ChatRelay`](crate::server::ChatRelay)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address and port the acceptor binds to
    pub listen_addr: SocketAddr,

    /// Maximum SAY payload length in characters; longer messages are
    /// rejected, not truncated
    pub max_message_len: usize,

    /// Maximum frame length in bytes; a longer frame is a fatal framing
    /// error for the connection that sent it
    pub max_frame_len: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}
