//! Wire protocol
//!
//! This module defines the relay's text wire format and command vocabulary.
//! Frames are delimited UTF-8 text: fields joined by `|`, a trailing `|`,
//! terminated by a newline. The codec never assumes one transport read
//! yields one frame.

mod command;
mod frame;

pub use command::{
    dispatch, Command, Event, Outcome, REASON_ALREADY_CONNECTED, REASON_MESSAGE_TOO_LONG,
    REASON_NAME_TAKEN,
};
pub use frame::{encode, Frame, FrameDecoder, FrameReader};

/// Field delimiter character
pub const FIELD_DELIMITER: char = '|';

/// Frame terminator byte
///
/// Never appears unescaped inside a frame, so scanning for it is always
/// unambiguous.
pub const FRAME_TERMINATOR: u8 = b'\n';

/// Escape character for delimiter, terminator and itself inside a field
pub const ESCAPE: char = '\\';
