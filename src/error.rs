//! Error types.
//!
//! Errors fall into two groups with deliberately different propagation:
//!
//! - [`ConfigError`] is returned from construction and fails fast.
//! - [`CodecError`] and [`TransformError`] describe per-message faults. The
//!   stage never propagates them to the pipeline; they are reported on the
//!   ignored channel and the offending message is dropped.
//!
//! [`WriteError`] is the host-facing error for writing into a stage that is
//! still busy with a deferred step or has halted.

use crate::message::Input;
use thiserror::Error;

/// Construction-time configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The caller asked for byte-stream mode (`object_mode = false`).
    #[error("codec transform requires object mode; do not set object_mode = false")]
    ByteStreamMode,
    /// The metadata property name was not a string.
    #[error(
        "optional `meta` property must be a string naming the message field \
         that carries metadata, found {found}"
    )]
    InvalidMetaProperty {
        /// Type name of the value that was supplied.
        found: &'static str,
    },
    /// The default metadata value could not be converted into the codec's
    /// metadata type.
    #[error("default metadata under `{key}` is invalid: {reason}")]
    InvalidDefault {
        /// Metadata property name the default was read from.
        key: String,
        /// Deserializer message.
        reason: String,
    },
    /// The configuration source could not be parsed.
    #[error("failed to parse transform configuration: {0}")]
    Parse(String),
    /// The configuration file could not be read.
    #[error("failed to read transform configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure raised by a codec's `expand` or `reduce`.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec does not implement the requested operation.
    #[error("{0}() not implemented")]
    NotImplemented(&'static str),
    /// Fewer bytes remain than the operation needs.
    #[error("truncated message: need {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Offset the read started at.
        offset: usize,
        /// Bytes requested.
        needed: usize,
        /// Bytes remaining from `offset`.
        available: usize,
    },
    /// `offset + length` does not fit in `usize`.
    #[error("buffer length overflow: offset {offset} + length {length}")]
    LengthOverflow {
        /// Current write offset.
        offset: usize,
        /// Additional bytes requested.
        length: usize,
    },
    /// Decoded bytes were not valid UTF-8.
    #[error("invalid utf-8 in message body")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// Codec-specific failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CodecError {
    /// Wraps an arbitrary error as a codec failure.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Other(err.into())
    }

    /// Returns `true` if this is an unimplemented-operation error.
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

/// A per-message fault contained by the stage.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The codec returned an error, or buffer growth failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The codec panicked.
    #[error("codec panicked: {0}")]
    Panicked(String),
}

impl TransformError {
    /// Returns the codec error, if this fault was not a panic.
    #[must_use]
    pub const fn codec_error(&self) -> Option<&CodecError> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Panicked(_) => None,
        }
    }

    /// Returns `true` if the codec panicked.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Error returned when the stage cannot admit an input.
///
/// Both variants hand the rejected input back to the caller.
#[derive(Debug, Error)]
pub enum WriteError<M> {
    /// A deferred step is still outstanding; drive `poll_ready` first.
    #[error("codec transform is busy with a deferred step")]
    Busy(Input<M>),
    /// The stage halted after a fault under [`FaultPolicy::Fail`](crate::FaultPolicy::Fail).
    #[error("codec transform halted after a fault")]
    Halted(Input<M>),
}

impl<M> WriteError<M> {
    /// Recovers the rejected input.
    #[must_use]
    pub fn into_input(self) -> Input<M> {
        match self {
            Self::Busy(input) | Self::Halted(input) => input,
        }
    }
}

/// Converts a panic payload into a readable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload.downcast_ref::<&'static str>().map_or_else(
        || {
            payload
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "non-string panic payload".to_owned())
        },
        |s| (*s).to_owned(),
    )
}
