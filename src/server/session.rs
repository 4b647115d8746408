//! Per-connection session state
//!
//! A [`Session`] owns the outbound side of one client connection. The read
//! half stays with the connection's worker task; the write half lives here
//! behind a lock because broadcasts invoke `send` from other sessions'
//! workers, and TCP gives no atomic message-sized writes.

use crate::protocol::Event;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport accepted, no name admitted yet
    Pending,
    /// Name registered and present in the roster
    Active,
    /// Terminal: transport released, name removed from the roster
    Closed,
}

/// One connected client
///
/// Created when a registration frame arrives; the display name never
/// changes after admission.
pub struct Session {
    name: String,
    peer_addr: SocketAddr,
    state: parking_lot::Mutex<SessionState>,
    writer: Mutex<OwnedWriteHalf>,
}

impl Session {
    /// Create a session around the write half of an accepted connection
    ///
    /// Starts in [`SessionState::Pending`]; admission into the roster moves
    /// it to `Active`.
    pub fn new(name: impl Into<String>, peer_addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            name: name.into(),
            peer_addr,
            state: parking_lot::Mutex::new(SessionState::Pending),
            writer: Mutex::new(writer),
        }
    }

    /// The session's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote address of the underlying connection
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn activate(&self) {
        *self.state.lock() = SessionState::Active;
    }

    /// Send one event to this session's client
    ///
    /// Safe to call from any task; the write lock serializes concurrent
    /// broadcast writes so frames never interleave on the wire.
    pub async fn send(&self, event: &Event) -> std::io::Result<()> {
        if self.state() == SessionState::Closed {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "session is closed",
            ));
        }

        let bytes = event.encode();
        let mut writer = self.writer.lock().await;
        writer.write_all(&bytes).await?;
        writer.flush().await
    }

    /// Close the outbound side of the transport
    ///
    /// Marks the session [`SessionState::Closed`] first so concurrent
    /// broadcasts stop targeting it; shutdown errors are ignored.
    pub async fn shutdown(&self) {
        *self.state.lock() = SessionState::Closed;
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("peer_addr", &self.peer_addr)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpListener, TcpStream};

    /// Accept one loopback connection and wrap its write half in a session
    async fn session_pair(name: &str) -> (Session, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer_addr) = listener.accept().await.unwrap();
        let (_read_half, write_half) = stream.into_split();
        (Session::new(name, peer_addr, write_half), client)
    }

    #[tokio::test]
    async fn send_writes_one_encoded_frame() {
        let (session, mut client) = session_pair("alice").await;
        session.activate();

        session
            .send(&Event::Connected {
                name: "alice".to_string(),
            })
            .await
            .unwrap();

        let mut received = vec![0u8; 64];
        let n = client.read(&mut received).await.unwrap();
        assert_eq!(&received[..n], b"CONNECTED|alice|\n");
    }

    #[tokio::test]
    async fn state_moves_pending_active_closed() {
        let (session, _client) = session_pair("alice").await;
        assert_eq!(session.state(), SessionState::Pending);
        session.activate();
        assert_eq!(session.state(), SessionState::Active);
        session.shutdown().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn send_after_shutdown_fails_without_panicking() {
        let (session, _client) = session_pair("alice").await;
        session.shutdown().await;

        let result = session
            .send(&Event::Joined {
                name: "bob".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
