//! The codec transform stage.
//!
//! [`CodecTransform`] admits one input at a time, normalizes it into a
//! [`Message`], resolves metadata and runs the codec's `expand` or `reduce`.
//! Every admitted input ends in exactly one of two states:
//!
//! - **emitted**: the step succeeded and its outputs are readable;
//! - **ignored**: the step faulted, produced nothing, and observers were
//!   told about it along with the original input.
//!
//! # Driving the stage
//!
//! ```text
//! write(input) ──► normalize ──► resolve meta ──► expand | reduce
//!                                                       │
//!        read() ◄── readable ◄── commit ◄───── Emit / Complete
//!                                   ▲
//!   poll_ready() ───────────────────┘  (Deferred steps)
//! ```
//!
//! A deferred step keeps the stage busy: `write` hands inputs back with
//! [`WriteError::Busy`] until [`poll_ready`](CodecTransform::poll_ready)
//! sees the deferred future resolve. Nothing bounds how long that takes; a
//! codec whose future never resolves stalls the stage.
//!
//! # Fault containment
//!
//! Errors returned by the codec, buffer growth overflow and panics raised
//! while running the codec (or polling its deferred future) are all
//! contained. Emits staged by a faulted step are discarded. Under
//! [`FaultPolicy::Fail`] the first fault also halts the stage.

mod observer;
mod stream;

pub use observer::{Ignored, IgnoredLog, IgnoredRecord};
pub use stream::Transformed;

use crate::buffer;
use crate::codec::{Codec, Deferred, Emitter, Outputs, Step};
use crate::config::{FaultPolicy, MetaProperty, TransformOptions};
use crate::error::{panic_message, CodecError, ConfigError, TransformError, WriteError};
use crate::message::{Input, Message};
use crate::metadata::{MetaAccessor, Metadata};
use crate::tracing_compat::{debug, trace, warn};
use futures_lite::stream::Stream;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::task::{Context, Poll};

type Observer<M> = Box<dyn FnMut(&Ignored<M>) + Send>;

/// Which codec operation a step ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Metadata was present: encode.
    Expand,
    /// Metadata was absent: decode.
    Reduce,
}

/// Counters over the lifetime of a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Inputs accepted by `write`.
    pub admitted: u64,
    /// Steps dispatched to `expand`.
    pub expanded: u64,
    /// Steps dispatched to `reduce`.
    pub reduced: u64,
    /// Messages made readable.
    pub emitted: u64,
    /// Inputs dropped after a contained fault.
    pub ignored: u64,
}

struct InFlight<M> {
    step: Option<StepKind>,
    fut: Deferred<M>,
    staged: Outputs<M>,
    original: Input<M>,
}

/// A duplex expand/reduce stage around a [`Codec`].
pub struct CodecTransform<C: Codec> {
    codec: C,
    meta_name: Option<String>,
    default_meta: Option<C::Meta>,
    accessor: MetaAccessor<C::Meta>,
    policy: FaultPolicy,
    readable: VecDeque<Message<C::Meta>>,
    in_flight: Option<InFlight<C::Meta>>,
    observers: Vec<Observer<C::Meta>>,
    halted: Option<TransformError>,
    stats: TransformStats,
}

impl<C> CodecTransform<C>
where
    C: Codec,
    C::Meta: 'static,
{
    /// Builds a stage, enforcing the construction contract.
    ///
    /// Fails if `options` request byte-stream mode or carry a metadata
    /// property that is not a string.
    pub fn new(codec: C, options: TransformOptions<C::Meta>) -> Result<Self, ConfigError> {
        options.validate()?;
        let TransformOptions {
            meta,
            default_meta,
            accessor,
            fault_policy,
            ..
        } = options;

        let meta_name = match meta {
            Some(MetaProperty::Name(name)) => Some(name),
            _ => None,
        };
        let default_meta = if meta_name.is_some() {
            default_meta
        } else {
            if default_meta.is_some() {
                debug!("default metadata without a meta property is unreachable; dropped");
            }
            None
        };

        debug!(
            meta = ?meta_name,
            has_default = default_meta.is_some(),
            policy = ?fault_policy,
            "codec transform created"
        );

        Ok(Self {
            codec,
            meta_name,
            default_meta,
            accessor: accessor.unwrap_or_default(),
            policy: fault_policy,
            readable: VecDeque::new(),
            in_flight: None,
            observers: Vec::new(),
            halted: None,
            stats: TransformStats::default(),
        })
    }

    /// Registers an observer for ignored messages.
    ///
    /// Observers receive the fault and the input exactly as it was written.
    pub fn on_ignored<F>(&mut self, observer: F)
    where
        F: FnMut(&Ignored<C::Meta>) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Admits one input and runs its step.
    ///
    /// Synchronous steps are finished when this returns: their outputs are
    /// readable, or the input was ignored. A deferred step keeps the stage
    /// busy until [`poll_ready`](Self::poll_ready) completes it.
    pub fn write(&mut self, input: impl Into<Input<C::Meta>>) -> Result<(), WriteError<C::Meta>> {
        let input = input.into();
        if self.halted.is_some() {
            return Err(WriteError::Halted(input));
        }
        if self.in_flight.is_some() {
            return Err(WriteError::Busy(input));
        }
        self.stats.admitted += 1;
        self.process(input);
        Ok(())
    }

    /// Drives an outstanding deferred step.
    ///
    /// Returns `Ready` once the stage can admit another input.
    pub fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        let Some(mut in_flight) = self.in_flight.take() else {
            return Poll::Ready(());
        };

        let polled = panic::catch_unwind(AssertUnwindSafe(|| in_flight.fut.as_mut().poll(cx)));
        let result = match polled {
            Ok(Poll::Pending) => {
                self.in_flight = Some(in_flight);
                return Poll::Pending;
            }
            Ok(Poll::Ready(Ok(outputs))) => Ok(outputs),
            Ok(Poll::Ready(Err(err))) => Err(TransformError::Codec(err)),
            Err(payload) => Err(TransformError::Panicked(panic_message(payload.as_ref()))),
        };

        let InFlight {
            step,
            mut staged,
            original,
            ..
        } = in_flight;
        match result {
            Ok(outputs) => {
                trace!(step = ?step, outputs = outputs.len(), "deferred step complete");
                staged.extend(outputs);
                self.commit(staged);
            }
            Err(error) => self.contain(error, original, step),
        }
        Poll::Ready(())
    }

    /// Waits until the stage can admit another input.
    pub fn ready(&mut self) -> impl Future<Output = ()> + '_ {
        futures_lite::future::poll_fn(move |cx| self.poll_ready(cx))
    }

    /// Takes the oldest readable output.
    pub fn read(&mut self) -> Option<Message<C::Meta>> {
        self.readable.pop_front()
    }

    /// Number of outputs waiting to be read.
    #[must_use]
    pub fn readable_len(&self) -> usize {
        self.readable.len()
    }

    /// Returns `true` while a deferred step is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns `true` if the stage halted under [`FaultPolicy::Fail`].
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// The fault that halted the stage, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&TransformError> {
        self.halted.as_ref()
    }

    /// The configured metadata property name.
    #[must_use]
    pub fn meta_name(&self) -> Option<&str> {
        self.meta_name.as_deref()
    }

    /// The stage-level default metadata.
    #[must_use]
    pub fn default_meta(&self) -> Option<&C::Meta> {
        self.default_meta.as_ref()
    }

    /// The configured fault policy.
    #[must_use]
    pub fn fault_policy(&self) -> FaultPolicy {
        self.policy
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> TransformStats {
        self.stats
    }

    /// Borrows the codec.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Mutably borrows the codec.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// Feeds `inputs` through this stage as a stream of outputs.
    pub fn transform_stream<S>(self, inputs: S) -> Transformed<S, C>
    where
        S: Stream,
        S::Item: Into<Input<C::Meta>>,
    {
        Transformed::new(inputs, self)
    }

    fn process(&mut self, input: Input<C::Meta>) {
        // Observers may be registered while a deferred step is in flight, so
        // the input is kept regardless of who is subscribed right now.
        let original = input.clone();
        let msg = input.normalize();
        let mut staged = Outputs::new();
        let mut step = None;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.dispatch(msg, &mut staged, &mut step)
        }));
        let result = match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(TransformError::Codec(err)),
            Err(payload) => Err(TransformError::Panicked(panic_message(payload.as_ref()))),
        };

        match (result, step) {
            (Ok(Step::Emit(msg)), _) => {
                staged.push(msg);
                self.commit(staged);
            }
            (Ok(Step::Complete), _) => self.commit(staged),
            (Ok(Step::Deferred(fut)), step) => {
                trace!(step = ?step, "step deferred");
                self.in_flight = Some(InFlight {
                    step,
                    fut,
                    staged,
                    original,
                });
            }
            (Err(error), step) => self.contain(error, original, step),
        }
    }

    fn dispatch(
        &mut self,
        mut msg: Message<C::Meta>,
        staged: &mut Outputs<C::Meta>,
        step: &mut Option<StepKind>,
    ) -> Result<Step<C::Meta>, CodecError> {
        let meta = if self.meta_name.is_some() {
            self.accessor.resolve(&msg, self.default_meta.as_ref())
        } else {
            None
        };
        let mut out = Emitter::new(staged);

        if let Some(meta) = meta {
            *step = Some(StepKind::Expand);
            self.stats.expanded += 1;
            let length = meta.encoded_len();
            trace!(offset = msg.offset, length, "expand");
            msg.data = buffer::grow(std::mem::take(&mut msg.data), msg.offset, length)?;
            self.codec.expand(meta, msg, &mut out)
        } else {
            *step = Some(StepKind::Reduce);
            self.stats.reduced += 1;
            trace!(offset = msg.offset, len = msg.data.len(), "reduce");
            self.codec.reduce(msg, &mut out)
        }
    }

    fn commit(&mut self, outputs: Outputs<C::Meta>) {
        self.stats.emitted += outputs.len() as u64;
        self.readable.extend(outputs);
    }

    fn contain(
        &mut self,
        error: TransformError,
        original: Input<C::Meta>,
        step: Option<StepKind>,
    ) {
        warn!(error = %error, step = ?step, "codec transform ignored message");
        self.stats.ignored += 1;

        let error = if self.observers.is_empty() {
            error
        } else {
            let event = Ignored {
                error,
                input: original,
                step,
            };
            for observer in &mut self.observers {
                observer(&event);
            }
            event.error
        };

        if self.policy == FaultPolicy::Fail {
            crate::tracing_compat::error!(error = %error, "codec transform halted");
            self.halted = Some(error);
        }
    }
}

impl<C: Codec> fmt::Debug for CodecTransform<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecTransform")
            .field("meta_name", &self.meta_name)
            .field("policy", &self.policy)
            .field("busy", &self.in_flight.is_some())
            .field("halted", &self.halted.is_some())
            .field("readable", &self.readable.len())
            .field("observers", &self.observers.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
