//! Server module
//!
//! The relay proper: per-connection sessions, the shared roster that
//! serializes admission and enumeration, and the acceptor that drives one
//! worker task per connection.

mod config;
mod relay;
mod roster;
mod session;

pub use config::{RelayConfig, DEFAULT_MAX_FRAME_LEN, DEFAULT_MAX_MESSAGE_LEN, DEFAULT_PORT};
pub use relay::ChatRelay;
pub use roster::Roster;
pub use session::{Session, SessionState};
