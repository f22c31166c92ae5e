//! Stream adapter that drives a stage from an input stream.

use super::CodecTransform;
use crate::codec::Codec;
use crate::error::WriteError;
use crate::message::{Input, Message};
use futures_lite::stream::Stream;
use pin_project::pin_project;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Outputs of a [`CodecTransform`] fed from `inputs`.
///
/// Pulls the next input only after the previous step completed and its
/// outputs were yielded, so outputs keep input order. Ends when the inputs
/// end, or when the stage halts under
/// [`FaultPolicy::Fail`](crate::FaultPolicy::Fail).
///
/// Created by [`CodecTransform::transform_stream`].
#[pin_project]
#[must_use = "streams do nothing unless polled"]
pub struct Transformed<S, C: Codec> {
    #[pin]
    inputs: S,
    stage: CodecTransform<C>,
    backlog: Option<Input<C::Meta>>,
    inputs_done: bool,
}

impl<S, C> Transformed<S, C>
where
    C: Codec,
{
    pub(super) fn new(inputs: S, stage: CodecTransform<C>) -> Self {
        Self {
            inputs,
            stage,
            backlog: None,
            inputs_done: false,
        }
    }

    /// Returns a reference to the stage.
    pub fn stage(&self) -> &CodecTransform<C> {
        &self.stage
    }

    /// Returns a mutable reference to the stage.
    pub fn stage_mut(&mut self) -> &mut CodecTransform<C> {
        &mut self.stage
    }

    /// Consumes the adapter, returning the input stream and the stage.
    pub fn into_inner(self) -> (S, CodecTransform<C>) {
        (self.inputs, self.stage)
    }
}

impl<S, C> Stream for Transformed<S, C>
where
    S: Stream,
    S::Item: Into<Input<C::Meta>>,
    C: Codec,
    C::Meta: 'static,
{
    type Item = Message<C::Meta>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(msg) = this.stage.read() {
                return Poll::Ready(Some(msg));
            }
            if this.stage.poll_ready(cx).is_pending() {
                return Poll::Pending;
            }
            if this.stage.readable_len() > 0 {
                continue;
            }
            if this.stage.is_halted() {
                return Poll::Ready(None);
            }

            let input = match this.backlog.take() {
                Some(input) => input,
                None if *this.inputs_done => return Poll::Ready(None),
                None => match this.inputs.as_mut().poll_next(cx) {
                    Poll::Ready(Some(item)) => item.into(),
                    Poll::Ready(None) => {
                        *this.inputs_done = true;
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
            };

            match this.stage.write(input) {
                Ok(()) => {}
                Err(WriteError::Busy(input)) => *this.backlog = Some(input),
                Err(WriteError::Halted(_)) => return Poll::Ready(None),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // A step may emit any number of outputs, including none.
        (self.stage.readable_len(), None)
    }
}

impl<S, C: Codec> fmt::Debug for Transformed<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformed")
            .field("stage", &self.stage)
            .field("backlog", &self.backlog.is_some())
            .field("inputs_done", &self.inputs_done)
            .finish_non_exhaustive()
    }
}
