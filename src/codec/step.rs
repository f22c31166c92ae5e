//! Step results and the emit handle.

use crate::error::CodecError;
use crate::message::Message;
use smallvec::SmallVec;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Messages produced by one step. Sized for the one-in-one-out case.
pub type Outputs<M> = SmallVec<[Message<M>; 1]>;

/// A step that completes later.
///
/// The stage admits no further input until this resolves.
pub type Deferred<M> = Pin<Box<dyn Future<Output = Result<Outputs<M>, CodecError>> + Send>>;

/// How a codec finished handling a message.
#[must_use = "the stage needs the step result to emit and complete"]
pub enum Step<M> {
    /// Emit this message and complete. The common one-to-one case.
    Emit(Message<M>),
    /// Everything was already pushed through the [`Emitter`].
    Complete,
    /// Completion is deferred to a future.
    Deferred(Deferred<M>),
}

impl<M> Step<M> {
    /// Defers a one-to-one step to `fut`.
    pub fn later<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Message<M>, CodecError>> + Send + 'static,
        M: Send + 'static,
    {
        Self::Deferred(Box::pin(async move {
            let msg = fut.await?;
            let mut outputs = Outputs::new();
            outputs.push(msg);
            Ok(outputs)
        }))
    }

    /// Returns `true` for a deferred step.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl<M> fmt::Debug for Step<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emit(msg) => f
                .debug_struct("Emit")
                .field("len", &msg.data.len())
                .field("offset", &msg.offset)
                .finish_non_exhaustive(),
            Self::Complete => f.write_str("Complete"),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Output handle passed to `expand` and `reduce`.
///
/// Emits are staged: the stage only publishes them if the step succeeds.
/// A step that emits and then fails produces no output.
pub struct Emitter<'a, M> {
    outputs: &'a mut Outputs<M>,
}

impl<'a, M> Emitter<'a, M> {
    /// Wraps a staging buffer.
    pub fn new(outputs: &'a mut Outputs<M>) -> Self {
        Self { outputs }
    }

    /// Pushes a message downstream.
    pub fn emit(&mut self, msg: Message<M>) {
        self.outputs.push(msg);
    }

    /// Number of messages emitted so far in this step.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.outputs.len()
    }
}

impl<M> fmt::Debug for Emitter<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("emitted", &self.outputs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    #[test]
    fn emitter_stages_outputs() {
        let mut outputs: Outputs<String> = Outputs::new();
        let mut out = Emitter::new(&mut outputs);
        out.emit(Message::new(vec![1]));
        out.emit(Message::new(vec![2]));
        assert_eq!(out.emitted(), 2);
        assert_eq!(outputs.len(), 2);
        assert!(!outputs.spilled(), "second message spills only past one");
    }

    #[test]
    fn later_wraps_single_message() {
        let step: Step<String> = Step::later(async { Ok(Message::new(vec![3])) });
        assert!(step.is_deferred());
        let Step::Deferred(fut) = step else {
            unreachable!("later builds a deferred step");
        };
        let outputs = block_on(fut).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].data, [3]);
    }

    #[test]
    fn later_propagates_error() {
        let step: Step<String> = Step::later(async { Err(CodecError::NotImplemented("reduce")) });
        let Step::Deferred(fut) = step else {
            unreachable!("later builds a deferred step");
        };
        assert!(block_on(fut).is_err());
    }

    #[test]
    fn debug_is_compact() {
        let step: Step<String> = Step::Emit(Message::new(vec![0; 4]).with_offset(2));
        let rendered = format!("{step:?}");
        assert!(rendered.contains("len: 4"));
        assert!(rendered.contains("offset: 2"));
        assert_eq!(format!("{:?}", Step::<String>::Complete), "Complete");
    }
}
