//! # chat-relay
//!
//! A TCP text chat relay: clients connect, register a unique display name,
//! and exchange broadcast messages through a central process.
//!
//! The wire format is delimited UTF-8 text (`TAG|field|…|` terminated by a
//! newline); the [`protocol`] module owns framing and the command
//! vocabulary, the [`server`] module owns sessions, the shared roster and
//! the acceptor.
//!
//! ## Quick start
//!
//! ```no_run
//! use chat_relay::{ChatRelay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_relay::Result<()> {
//!     let relay = ChatRelay::bind(RelayConfig::default()).await?;
//!     relay.run().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod protocol;
pub mod server;

// Re-export main types
pub use error::{FramingError, ProtocolError, RelayError, Result};
pub use protocol::{Command, Event, Frame, FrameDecoder, FrameReader, Outcome};
pub use server::{ChatRelay, RelayConfig, Roster, Session, SessionState};
