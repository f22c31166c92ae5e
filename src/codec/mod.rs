//! The codec extension point.
//!
//! This module provides the [`Codec`] trait plus the [`Step`] result a codec
//! hands back to the stage after each expand or reduce.

pub mod step;

pub use step::{Deferred, Emitter, Outputs, Step};

use crate::error::CodecError;
use crate::message::Message;
use crate::metadata::Metadata;

/// Encode metadata into message buffers and decode it back out.
///
/// Both operations receive the message by value and must hand it on exactly
/// once: by returning [`Step::Emit`], by pushing it through the [`Emitter`]
/// and returning [`Step::Complete`], or by resolving a [`Step::Deferred`]
/// future with it.
///
/// The default implementations report [`CodecError::NotImplemented`]. A
/// stage treats that like any other per-message fault: the message is
/// dropped and reported as ignored.
pub trait Codec {
    /// Metadata type this codec expands and reduces.
    type Meta: Metadata;

    /// Serialize `meta` into `msg.data` at `msg.offset`.
    ///
    /// The stage has already grown `msg.data` to hold at least
    /// `msg.offset + meta.encoded_len()` bytes. Implementations advance
    /// `msg.offset` by the number of bytes written.
    fn expand(
        &mut self,
        meta: Self::Meta,
        msg: Message<Self::Meta>,
        out: &mut Emitter<'_, Self::Meta>,
    ) -> Result<Step<Self::Meta>, CodecError> {
        let _ = (meta, msg, out);
        Err(CodecError::NotImplemented("expand"))
    }

    /// Deserialize metadata from `msg.data` at `msg.offset`.
    ///
    /// Implementations store the decoded value in `msg.meta` and advance
    /// `msg.offset` by the number of bytes consumed.
    fn reduce(
        &mut self,
        msg: Message<Self::Meta>,
        out: &mut Emitter<'_, Self::Meta>,
    ) -> Result<Step<Self::Meta>, CodecError> {
        let _ = (msg, out);
        Err(CodecError::NotImplemented("reduce"))
    }
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    type Meta = C::Meta;

    fn expand(
        &mut self,
        meta: Self::Meta,
        msg: Message<Self::Meta>,
        out: &mut Emitter<'_, Self::Meta>,
    ) -> Result<Step<Self::Meta>, CodecError> {
        (**self).expand(meta, msg, out)
    }

    fn reduce(
        &mut self,
        msg: Message<Self::Meta>,
        out: &mut Emitter<'_, Self::Meta>,
    ) -> Result<Step<Self::Meta>, CodecError> {
        (**self).reduce(msg, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unimplemented;

    impl Codec for Unimplemented {
        type Meta = String;
    }

    #[test]
    fn defaults_report_not_implemented() {
        let mut codec = Unimplemented;
        let mut outputs = Outputs::new();
        let mut out = Emitter::new(&mut outputs);

        let err = codec
            .expand("m".to_owned(), Message::new(vec![0]), &mut out)
            .unwrap_err();
        assert!(matches!(err, CodecError::NotImplemented("expand")));

        let err = codec.reduce(Message::new(vec![0]), &mut out).unwrap_err();
        assert!(matches!(err, CodecError::NotImplemented("reduce")));
        assert!(outputs.is_empty());
    }

    #[test]
    fn boxed_codec_forwards() {
        let mut codec: Box<Unimplemented> = Box::new(Unimplemented);
        let mut outputs = Outputs::new();
        let mut out = Emitter::new(&mut outputs);
        let err = codec.reduce(Message::new(vec![]), &mut out).unwrap_err();
        assert!(err.is_not_implemented());
    }
}
