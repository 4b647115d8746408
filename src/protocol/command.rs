//! Command vocabulary and pure dispatch
//!
//! Client→server commands, server→client events, and the dispatch table
//! that maps a command from an admitted session to the action the server
//! applies. This module performs no socket I/O; the caller applies the
//! returned [`Outcome`] against the roster.

use crate::protocol::{encode, Frame};

/// Rejection reason sent when a registration name is already in use
pub const REASON_NAME_TAKEN: &str = "Name is Taken";

/// Rejection reason sent for a second CONNECT on an admitted session
pub const REASON_ALREADY_CONNECTED: &str = "Already connected";

/// Rejection reason sent when a SAY payload exceeds the configured cap
pub const REASON_MESSAGE_TOO_LONG: &str = "Message is too long";

/// A client→server command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a display name
    Connect {
        /// Requested display name
        name: String,
    },

    /// Broadcast a line of text to every other admitted session
    Say {
        /// Message payload
        text: String,
    },

    /// Leave the chat and close the connection
    Exit,

    /// Anything else: an unrecognized tag, or a recognized tag missing its
    /// required fields
    Unknown {
        /// The tag as received (already case-normalized)
        tag: String,
    },
}

impl Command {
    /// Interpret a decoded frame as a command
    ///
    /// Never fails: malformed input (unknown tag, missing fields) becomes
    /// [`Command::Unknown`] so an admitted session gets an `ERROR` reply
    /// instead of a dropped connection.
    pub fn from_frame(frame: &Frame) -> Self {
        match (frame.tag.as_str(), frame.fields.as_slice()) {
            ("CONNECT", [name, ..]) => Self::Connect { name: name.clone() },
            ("SAY", [text, ..]) => Self::Say { text: text.clone() },
            ("EXIT", _) => Self::Exit,
            _ => Self::Unknown {
                tag: frame.tag.clone(),
            },
        }
    }
}

/// A server→client event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Registration succeeded; sent to the new session only
    Connected {
        /// The admitted display name
        name: String,
    },

    /// A request was refused; the session may or may not survive depending
    /// on the reason (a taken name closes the connection, the rest do not)
    Rejected {
        /// Display name the rejection concerns
        name: String,
        /// Human-readable reason
        reason: String,
    },

    /// Another session was admitted
    Joined {
        /// Display name of the newcomer
        name: String,
    },

    /// A session departed, by EXIT or transport loss
    Left {
        /// Display name of the departed session
        name: String,
    },

    /// A broadcast message from another session
    Public {
        /// Display name of the sender
        sender: String,
        /// Message payload
        text: String,
    },

    /// The server did not recognize a command tag
    Error {
        /// The offending tag, echoed back
        tag: String,
    },
}

impl Event {
    /// Wire tag for this event
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "CONNECTED",
            Self::Rejected { .. } => "REJECTED",
            Self::Joined { .. } => "JOINED",
            Self::Left { .. } => "LEFT",
            Self::Public { .. } => "PUBLIC",
            Self::Error { .. } => "ERROR",
        }
    }

    /// Encode this event into wire bytes
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Connected { name } | Self::Joined { name } | Self::Left { name } => {
                encode(self.tag(), &[name])
            },
            Self::Rejected { name, reason } => encode(self.tag(), &[name, reason]),
            Self::Public { sender, text } => encode(self.tag(), &[sender, text]),
            Self::Error { tag } => encode(self.tag(), &[tag]),
        }
    }

    /// Interpret a decoded frame as an event, if it matches the vocabulary
    ///
    /// The inverse of [`Event::encode`]; used by clients and tests reading
    /// the server side of the wire.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        match (frame.tag.as_str(), frame.fields.as_slice()) {
            ("CONNECTED", [name]) => Some(Self::Connected { name: name.clone() }),
            ("REJECTED", [name, reason]) => Some(Self::Rejected {
                name: name.clone(),
                reason: reason.clone(),
            }),
            ("JOINED", [name]) => Some(Self::Joined { name: name.clone() }),
            ("LEFT", [name]) => Some(Self::Left { name: name.clone() }),
            ("PUBLIC", [sender, text]) => Some(Self::Public {
                sender: sender.clone(),
                text: text.clone(),
            }),
            ("ERROR", [tag]) => Some(Self::Error { tag: tag.clone() }),
            _ => None,
        }
    }
}

/// The action an admitted session's command maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send one event back to the issuing session only
    Reply(Event),

    /// Send one event to every other admitted session
    Broadcast(Event),

    /// Remove the issuing session from the roster, broadcast the farewell
    /// to the remaining sessions, and close the transport
    Leave(Event),
}

/// Map a command from an admitted session to the action to apply
///
/// Pure: the caller owns all roster mutation and I/O. `sender` is the
/// issuing session's admitted name; `max_message_len` caps SAY payloads in
/// characters.
pub fn dispatch(command: &Command, sender: &str, max_message_len: usize) -> Outcome {
    match command {
        Command::Connect { .. } => Outcome::Reply(Event::Rejected {
            name: sender.to_string(),
            reason: REASON_ALREADY_CONNECTED.to_string(),
        }),
        Command::Say { text } => {
            if text.chars().count() > max_message_len {
                Outcome::Reply(Event::Rejected {
                    name: sender.to_string(),
                    reason: REASON_MESSAGE_TOO_LONG.to_string(),
                })
            } else {
                Outcome::Broadcast(Event::Public {
                    sender: sender.to_string(),
                    text: text.clone(),
                })
            }
        },
        Command::Exit => Outcome::Leave(Event::Left {
            name: sender.to_string(),
        }),
        Command::Unknown { tag } => Outcome::Reply(Event::Error { tag: tag.clone() }),
    }
}
