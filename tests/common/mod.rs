//! Common test helpers and utilities
//!
//! Spawns an in-process relay on an ephemeral port and wraps client
//! connections in a small framed-I/O harness.

use chat_relay::server::Roster;
use chat_relay::{protocol, ChatRelay, Event, FrameReader, RelayConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

/// How long a test waits for an event that should arrive
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a test listens for an event that should NOT arrive
pub const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// Default test configuration: loopback, ephemeral port
pub fn test_config() -> RelayConfig {
    RelayConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        ..RelayConfig::default()
    }
}

/// Start a relay on an ephemeral loopback port
///
/// Returns the bound address and a roster handle for assertions about who
/// is admitted. The accept loop runs on a background task for the rest of
/// the test.
pub async fn spawn_relay(config: RelayConfig) -> (SocketAddr, Arc<Roster>) {
    let relay = ChatRelay::bind(config).await.unwrap();
    let addr = relay.local_addr().unwrap();
    let roster = relay.roster();
    tokio::spawn(relay.run());
    (addr, roster)
}

/// One test client speaking the relay's wire protocol
pub struct TestClient {
    writer: OwnedWriteHalf,
    frames: FrameReader<OwnedReadHalf>,
}

impl TestClient {
    /// Open a TCP connection to the relay
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        Self {
            writer: write_half,
            frames: FrameReader::new(read_half, 4096),
        }
    }

    /// Write raw bytes, bypassing the encoder
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Send an encoded command frame
    pub async fn send(&mut self, tag: &str, fields: &[&str]) {
        let bytes = protocol::encode(tag, fields);
        self.send_raw(&bytes).await;
    }

    /// Register a display name and return the server's reply
    pub async fn register(&mut self, name: &str) -> Event {
        self.send("CONNECT", &[name]).await;
        self.expect_event().await
    }

    /// Send a SAY command
    pub async fn say(&mut self, text: &str) {
        self.send("SAY", &[text]).await;
    }

    /// Read the next server event, panicking if none arrives in time or
    /// the frame is outside the event vocabulary
    pub async fn expect_event(&mut self) -> Event {
        let frame = timeout(EVENT_TIMEOUT, self.frames.next_frame())
            .await
            .expect("timed out waiting for an event")
            .expect("transport failed while waiting for an event")
            .expect("connection closed while waiting for an event");
        Event::from_frame(&frame).unwrap_or_else(|| panic!("unexpected frame: {frame:?}"))
    }

    /// Assert the server closes this connection (EOF or reset)
    pub async fn expect_close(&mut self) {
        let next = timeout(EVENT_TIMEOUT, self.frames.next_frame())
            .await
            .expect("timed out waiting for the connection to close");
        match next {
            Ok(None) | Err(_) => {},
            Ok(Some(frame)) => panic!("expected close, got frame: {frame:?}"),
        }
    }

    /// Assert no event arrives within the silence window
    pub async fn expect_silence(&mut self) {
        let next = timeout(SILENCE_WINDOW, self.frames.next_frame()).await;
        if let Ok(Ok(Some(frame))) = next {
            panic!("expected silence, got frame: {frame:?}");
        }
    }
}
