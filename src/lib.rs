//! codec-transform: a duplex expand/reduce codec stage.
//!
//! # Overview
//!
//! A [`CodecTransform`] sits in a one-in-one-out pipeline and, for every
//! message it admits, either *expands* metadata into the message's byte
//! buffer or *reduces* bytes from that buffer back into metadata. Which
//! direction runs is decided by metadata presence alone: a message that
//! carries metadata (or inherits the stage default) is encoded, anything
//! else is decoded.
//!
//! Concrete codecs implement [`Codec`]. The stage takes care of the rest:
//!
//! - **Normalization**: raw byte buffers become [`Message`]s at offset 0
//! - **Buffer growth**: the buffer is sized to `offset + encoded_len` before
//!   `expand` runs (see [`buffer::grow`])
//! - **Dispatch**: per-message metadata wins over the stage default
//! - **Fault containment**: codec errors and panics drop the message and are
//!   reported on the ignored channel instead of stalling the pipeline
//!
//! # Module Structure
//!
//! - [`buffer`]: Exact-size buffer growth
//! - [`codec`]: The [`Codec`] extension point and step results
//! - [`config`]: Construction options and fault policy
//! - [`error`](mod@error): Error types
//! - [`message`]: Messages and raw inputs
//! - [`metadata`]: Metadata values and accessors
//! - [`transform`]: The stage, its stream adapter and fault observers
//! - [`tracing_compat`]: Optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use codec_transform::{
//!     Codec, CodecError, CodecTransform, Emitter, Message, Step, TransformOptions,
//! };
//!
//! struct Byte;
//!
//! impl Codec for Byte {
//!     type Meta = Vec<u8>;
//!
//!     fn expand(
//!         &mut self,
//!         meta: Vec<u8>,
//!         mut msg: Message<Vec<u8>>,
//!         _out: &mut Emitter<'_, Vec<u8>>,
//!     ) -> Result<Step<Vec<u8>>, CodecError> {
//!         msg.data[msg.offset..msg.offset + meta.len()].copy_from_slice(&meta);
//!         msg.offset += meta.len();
//!         Ok(Step::Emit(msg))
//!     }
//!
//!     fn reduce(
//!         &mut self,
//!         mut msg: Message<Vec<u8>>,
//!         _out: &mut Emitter<'_, Vec<u8>>,
//!     ) -> Result<Step<Vec<u8>>, CodecError> {
//!         let byte = msg.take(1)?.to_vec();
//!         msg.meta = Some(byte);
//!         Ok(Step::Emit(msg))
//!     }
//! }
//!
//! let options = TransformOptions::new().meta("b");
//! let mut stage = CodecTransform::new(Byte, options)?;
//!
//! stage.write(vec![7u8, 8])?;
//! let msg = stage.read().expect("one output per input");
//! assert_eq!(msg.meta.as_deref(), Some(&[7u8][..]));
//! assert_eq!(msg.offset, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_inception)]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod metadata;
pub mod tracing_compat;
pub mod transform;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use codec::{Codec, Deferred, Emitter, Outputs, Step};
pub use config::{FaultPolicy, TransformOptions};
pub use error::{CodecError, ConfigError, TransformError, WriteError};
pub use message::{Input, Message};
pub use metadata::{MetaAccessor, Metadata};
pub use transform::{
    CodecTransform, Ignored, IgnoredLog, IgnoredRecord, StepKind, TransformStats, Transformed,
};
