//! Messages flowing through a codec transform.
//!
//! A [`Message`] pairs a growable byte buffer with a read/write cursor and
//! an optional metadata slot. Callers may also write bare byte buffers; the
//! stage normalizes those into messages at offset 0 (see [`Input`]).

use crate::error::CodecError;

/// The unit of work handled by a codec transform.
///
/// `offset` is a cursor into `data`: `expand` writes at it and `reduce`
/// reads from it, and both advance it by the number of bytes handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message<M> {
    /// Message body.
    pub data: Vec<u8>,
    /// Cursor into `data`.
    pub offset: usize,
    /// Metadata carried by this message. Set by callers to request an
    /// expand, and by codecs to publish a reduced value.
    pub meta: Option<M>,
}

impl<M> Message<M> {
    /// Creates a message over `data` at offset 0 with no metadata.
    #[must_use]
    pub const fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            offset: 0,
            meta: None,
        }
    }

    /// Sets the cursor.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Attaches metadata to be expanded.
    #[must_use]
    pub fn with_meta(mut self, meta: M) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Bytes from the cursor to the end of the buffer.
    ///
    /// Empty when the cursor is at or past the end.
    #[must_use]
    pub fn remaining(&self) -> &[u8] {
        self.data.get(self.offset..).unwrap_or_default()
    }

    /// Reads `len` bytes at the cursor and advances past them.
    pub fn take(&mut self, len: usize) -> Result<&[u8], CodecError> {
        let start = self.offset;
        let available = self.data.len().saturating_sub(start);
        if available < len {
            return Err(CodecError::Truncated {
                offset: start,
                needed: len,
                available,
            });
        }
        self.offset += len;
        Ok(&self.data[start..start + len])
    }

    /// Writes `bytes` at the cursor and advances past them.
    ///
    /// The buffer must already be large enough; the stage grows it before
    /// `expand` runs.
    pub fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let start = self.offset;
        let available = self.data.len().saturating_sub(start);
        if available < bytes.len() {
            return Err(CodecError::Truncated {
                offset: start,
                needed: bytes.len(),
                available,
            });
        }
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        Ok(())
    }
}

/// An item written into a codec transform.
///
/// The stage accepts either a structured [`Message`] or a bare byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<M> {
    /// A bare buffer, normalized to `Message { data, offset: 0, meta: None }`.
    Raw(Vec<u8>),
    /// A structured message, used as-is.
    Message(Message<M>),
}

impl<M> Input<M> {
    /// Normalizes the input into a message.
    #[must_use]
    pub fn normalize(self) -> Message<M> {
        match self {
            Self::Raw(data) => Message::new(data),
            Self::Message(msg) => msg,
        }
    }

    /// Returns `true` for a bare buffer.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl<M> From<Vec<u8>> for Input<M> {
    fn from(data: Vec<u8>) -> Self {
        Self::Raw(data)
    }
}

impl<M> From<&[u8]> for Input<M> {
    fn from(data: &[u8]) -> Self {
        Self::Raw(data.to_vec())
    }
}

impl<M, const N: usize> From<&[u8; N]> for Input<M> {
    fn from(data: &[u8; N]) -> Self {
        Self::Raw(data.to_vec())
    }
}

impl<M> From<Message<M>> for Input<M> {
    fn from(msg: Message<M>) -> Self {
        Self::Message(msg)
    }
}
