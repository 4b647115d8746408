//! Connection acceptor and per-connection dispatch
//!
//! The accept loop only accepts: every connection, including its
//! registration handshake, runs on its own spawned worker task, so a slow
//! or malicious first frame can never stall new accepts. All per-connection
//! failures are contained to that connection's worker.

use crate::error::{ProtocolError, Result};
use crate::protocol::{
    dispatch, Command, Event, FrameReader, Outcome, REASON_NAME_TAKEN,
};
use crate::server::{RelayConfig, Roster, Session};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// The chat relay server
///
/// Binds a TCP listener and relays broadcast messages between admitted
/// sessions.
///
/// # Example
///
/// ```no_run
/// use chat_relay::{ChatRelay, RelayConfig};
///
/// # async fn example() -> chat_relay::Result<()> {
/// let relay = ChatRelay::bind(RelayConfig::default()).await?;
/// relay.run().await
/// # }
/// ```
pub struct ChatRelay {
    listener: TcpListener,
    roster: Arc<Roster>,
    config: RelayConfig,
}

impl ChatRelay {
    /// Bind the listener described by `config`
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr).await?;
        Ok(Self {
            listener,
            roster: Arc::new(Roster::new()),
            config,
        })
    }

    /// The address the listener actually bound to
    ///
    /// Differs from the configured address when the configured port was 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared roster, for diagnostics
    pub fn roster(&self) -> Arc<Roster> {
        Arc::clone(&self.roster)
    }

    /// Accept connections until the process stops
    ///
    /// Each accepted connection gets its own worker task. An accept error
    /// is logged and the loop keeps accepting; one bad connection never
    /// takes the server down.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "relay listening");
        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    debug!(%peer_addr, "accepted connection");
                    let roster = Arc::clone(&self.roster);
                    let config = self.config.clone();
                    tokio::spawn(async move {
                        if let Err(error) = handle_connection(roster, config, stream, peer_addr).await {
                            debug!(%peer_addr, %error, "connection closed with error");
                        }
                    });
                },
                Err(error) => {
                    warn!(%error, "failed to accept connection");
                },
            }
        }
    }
}

/// Drive one connection from handshake to close
///
/// Implements the session state machine: `PENDING` until a `CONNECT` with a
/// free name is admitted, `ACTIVE` through the command loop, `CLOSED` on
/// exit, protocol violation or transport loss. Cleanup is identical on
/// every path out: remove from the roster if admitted, broadcast `LEFT` to
/// the remaining sessions, release the transport.
async fn handle_connection(
    roster: Arc<Roster>,
    config: RelayConfig,
    stream: TcpStream,
    peer_addr: SocketAddr,
) -> Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut frames = FrameReader::new(read_half, config.max_frame_len);

    // PENDING: the handshake position accepts only CONNECT
    let first = match frames.next_frame().await? {
        Some(frame) => frame,
        None => return Ok(()),
    };
    let name = match Command::from_frame(&first) {
        Command::Connect { name } => name,
        _ => {
            debug!(%peer_addr, tag = %first.tag, "closing unregistered connection");
            return Err(ProtocolError::HandshakeRequired { got: first.tag }.into());
        },
    };

    let session = Arc::new(Session::new(name.clone(), peer_addr, write_half));
    if !roster.try_admit(Arc::clone(&session)) {
        info!(%name, %peer_addr, "name taken, rejecting connection");
        let rejection = Event::Rejected {
            name: name.clone(),
            reason: REASON_NAME_TAKEN.to_string(),
        };
        // Best effort: the loser may already be gone
        let _ = session.send(&rejection).await;
        session.shutdown().await;
        return Ok(());
    }

    info!(%name, %peer_addr, "session admitted");
    let admitted = session
        .send(&Event::Connected { name: name.clone() })
        .await;
    if admitted.is_ok() {
        roster
            .broadcast(&Event::Joined { name: name.clone() }, Some(&name))
            .await;
    }

    // ACTIVE: decode, dispatch, apply, until EXIT or transport loss
    let result = match admitted {
        Ok(()) => command_loop(&roster, &config, &mut frames, &session).await,
        Err(error) => Err(error.into()),
    };

    // CLOSED: the EXIT path already removed the session; every other path
    // cleans up here, so a departure broadcasts exactly one LEFT
    if roster.remove(&name).is_some() {
        roster
            .broadcast(&Event::Left { name: name.clone() }, Some(&name))
            .await;
    }
    session.shutdown().await;
    info!(%name, %peer_addr, "session closed");
    result
}

/// The ACTIVE-state command loop
///
/// Returns `Ok` on clean departure (EXIT, or EOF at a frame boundary) and
/// an error on framing or transport failure; the caller's cleanup is the
/// same either way.
async fn command_loop(
    roster: &Roster,
    config: &RelayConfig,
    frames: &mut FrameReader<OwnedReadHalf>,
    session: &Arc<Session>,
) -> Result<()> {
    loop {
        let frame = match frames.next_frame().await? {
            Some(frame) => frame,
            None => return Ok(()),
        };

        let command = Command::from_frame(&frame);
        match dispatch(&command, session.name(), config.max_message_len) {
            Outcome::Reply(event) => {
                debug!(name = %session.name(), tag = %frame.tag, "replying to session");
                session.send(&event).await?;
            },
            Outcome::Broadcast(event) => {
                if let Event::Public { sender, text } = &event {
                    debug!(%sender, %text, "relaying message");
                }
                roster.broadcast(&event, Some(session.name())).await;
            },
            Outcome::Leave(farewell) => {
                if roster.remove(session.name()).is_some() {
                    roster.broadcast(&farewell, Some(session.name())).await;
                }
                return Ok(());
            },
        }
    }
}
