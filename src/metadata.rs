//! Metadata values and how a stage finds them on a message.
//!
//! Metadata presence is the only switch between expand and reduce, so two
//! questions have to be answered per message: *is there a value* and *how
//! long is it*. [`Metadata`] answers both for the value itself, and
//! [`MetaAccessor`] pulls the per-message value off a [`Message`]. The
//! stage falls back to its configured default when the accessor yields
//! nothing present.

use crate::message::Message;
use std::fmt;
use std::sync::Arc;

/// A value a codec can expand into a message buffer.
pub trait Metadata: Clone {
    /// Number of bytes the stage reserves at the cursor before `expand`.
    fn encoded_len(&self) -> usize;

    /// Whether this value selects the expand path.
    ///
    /// Defaults to `true`. Text types treat an empty string as absent so
    /// the stage falls back to its default, and then to reduce.
    fn is_present(&self) -> bool {
        true
    }
}

impl Metadata for String {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Metadata for Vec<u8> {
    fn encoded_len(&self) -> usize {
        self.len()
    }
}

impl Metadata for Arc<str> {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Metadata for &'static str {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

type AccessorFn<M> = dyn Fn(&Message<M>) -> Option<M> + Send + Sync;

/// Strategy that extracts per-message metadata.
///
/// The default accessor clones `message.meta`. Custom accessors let a codec
/// derive metadata from something else on the message, e.g. a prefix of
/// the body.
pub struct MetaAccessor<M> {
    get: Arc<AccessorFn<M>>,
}

impl<M: Clone + 'static> MetaAccessor<M> {
    /// Reads `message.meta`.
    #[must_use]
    pub fn field() -> Self {
        Self::new(|msg: &Message<M>| msg.meta.clone())
    }
}

impl<M> MetaAccessor<M> {
    /// Wraps a lookup function.
    pub fn new<F>(get: F) -> Self
    where
        F: Fn(&Message<M>) -> Option<M> + Send + Sync + 'static,
    {
        Self { get: Arc::new(get) }
    }

    /// Returns the metadata this accessor sees on `msg`.
    pub fn get(&self, msg: &Message<M>) -> Option<M> {
        (self.get)(msg)
    }
}

impl<M: Metadata> MetaAccessor<M> {
    /// Two-step lookup: the message's own value, then `default`.
    ///
    /// Values that are not [present](Metadata::is_present) are skipped at
    /// both steps.
    pub fn resolve(&self, msg: &Message<M>, default: Option<&M>) -> Option<M> {
        self.get(msg)
            .filter(|m| m.is_present())
            .or_else(|| default.filter(|m| m.is_present()).cloned())
    }
}

impl<M: Clone + 'static> Default for MetaAccessor<M> {
    fn default() -> Self {
        Self::field()
    }
}

impl<M> Clone for MetaAccessor<M> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
        }
    }
}

impl<M> fmt::Debug for MetaAccessor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaAccessor").finish_non_exhaustive()
    }
}
