//! Frame codec: delimited text frames over a byte stream
//!
//! A frame is `TAG|field|field|…|\n`. Inside a field, `\` is written `\\`,
//! `|` is written `\|` and a newline is written `\n`, so neither the
//! delimiter nor the terminator ever appears raw in a field.
//!
//! Decoding works on an accumulation buffer: newly received bytes are
//! appended and complete frames are extracted from the front, retaining any
//! trailing partial frame for the next read. A frame split across many reads
//! and many frames arriving in one read are both handled by the same loop.

use crate::error::{FramingError, RelayError};
use crate::protocol::{ESCAPE, FIELD_DELIMITER, FRAME_TERMINATOR};
use tokio::io::{AsyncRead, AsyncReadExt};

/// One complete logical message extracted from the stream
///
/// The tag is ASCII-uppercased at parse time; command matching is
/// case-insensitive on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command tag, normalized to uppercase
    pub tag: String,
    /// Ordered field payload; count and meaning depend on the tag
    pub fields: Vec<String>,
}

impl Frame {
    /// Parse the text of a single frame (terminator already stripped)
    pub fn parse(text: &str) -> Result<Self, FramingError> {
        let mut parts = split_fields(text)?;

        // The canonical shapes end with a trailing delimiter, which splits
        // into one empty segment; drop it, but keep genuinely empty fields
        // before it.
        if parts.len() > 1 && parts.last().is_some_and(|field| field.is_empty()) {
            parts.pop();
        }

        let mut parts = parts.into_iter();
        let tag = parts.next().unwrap_or_default().to_ascii_uppercase();
        Ok(Self {
            tag,
            fields: parts.collect(),
        })
    }
}

/// Encode a frame for transmission
///
/// Escapes each field, joins with the delimiter, appends the trailing
/// delimiter and the terminator.
///
/// # Example
///
/// ```
/// use chat_relay::protocol::encode;
///
/// assert_eq!(encode("PUBLIC", &["alice", "hi"]), b"PUBLIC|alice|hi|\n");
/// ```
pub fn encode(tag: &str, fields: &[&str]) -> Vec<u8> {
    let mut out = String::with_capacity(tag.len() + 2);
    escape_into(&mut out, tag);
    for field in fields {
        out.push(FIELD_DELIMITER);
        escape_into(&mut out, field);
    }
    out.push(FIELD_DELIMITER);
    out.push(FRAME_TERMINATOR as char);
    out.into_bytes()
}

fn escape_into(out: &mut String, field: &str) {
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            FIELD_DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
}

/// Split frame text on unescaped delimiters, unescaping each field
fn split_fields(text: &str) -> Result<Vec<String>, FramingError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            match c {
                ESCAPE => current.push(ESCAPE),
                FIELD_DELIMITER => current.push(FIELD_DELIMITER),
                'n' => current.push('\n'),
                other => return Err(FramingError::InvalidEscape(other)),
            }
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == FIELD_DELIMITER {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    if escaped {
        // The escape swallowed the frame terminator itself
        return Err(FramingError::InvalidEscape(FRAME_TERMINATOR as char));
    }

    fields.push(current);
    Ok(fields)
}

/// Streaming frame decoder with a per-connection accumulation buffer
///
/// `extend` appends received bytes; `try_next` extracts complete frames from
/// the front. The size ceiling is enforced even before a terminator arrives,
/// so a peer that never sends one cannot grow the buffer without bound.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_frame_len: usize,
}

impl FrameDecoder {
    /// Create a decoder with the given frame-size ceiling (in bytes,
    /// excluding the terminator)
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_frame_len,
        }
    }

    /// Append newly received bytes to the accumulation buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Whether a partial frame is buffered
    ///
    /// EOF while this is true means the transport closed mid-frame.
    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Extract the next complete frame, or `None` if the buffer holds no
    /// full frame yet
    pub fn try_next(&mut self) -> Result<Option<Frame>, FramingError> {
        match self.buf.iter().position(|&b| b == FRAME_TERMINATOR) {
            Some(pos) => {
                if pos > self.max_frame_len {
                    return Err(FramingError::FrameTooLong {
                        len: pos,
                        max: self.max_frame_len,
                    });
                }
                let rest = self.buf.split_off(pos + 1);
                let mut line = std::mem::replace(&mut self.buf, rest);
                line.pop(); // terminator
                let text = String::from_utf8(line).map_err(|_| FramingError::InvalidUtf8)?;
                Frame::parse(&text).map(Some)
            },
            None => {
                if self.buf.len() > self.max_frame_len {
                    return Err(FramingError::FrameTooLong {
                        len: self.buf.len(),
                        max: self.max_frame_len,
                    });
                }
                Ok(None)
            },
        }
    }
}

/// Lazy frame sequence over an async byte stream
///
/// Couples a read half with a [`FrameDecoder`]; `next_frame` suspends
/// between frames. Clean EOF at a frame boundary yields `Ok(None)`; EOF in
/// the middle of a frame is a [`FramingError::TruncatedFrame`], treated by
/// callers as an implicit disconnect rather than a crash.
pub struct FrameReader<R> {
    reader: R,
    decoder: FrameDecoder,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap a read half with the given frame-size ceiling
    pub fn new(reader: R, max_frame_len: usize) -> Self {
        Self {
            reader,
            decoder: FrameDecoder::new(max_frame_len),
        }
    }

    /// Read the next frame, suspending until enough bytes arrive
    pub async fn next_frame(&mut self) -> Result<Option<Frame>, RelayError> {
        let mut chunk = [0u8; 512];
        loop {
            if let Some(frame) = self.decoder.try_next()? {
                return Ok(Some(frame));
            }
            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                if self.decoder.has_partial() {
                    return Err(FramingError::TruncatedFrame.into());
                }
                return Ok(None);
            }
            self.decoder.extend(&chunk[..n]);
        }
    }
}
