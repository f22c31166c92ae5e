//! The ignored-message channel.

use super::StepKind;
use crate::error::TransformError;
use crate::message::Input;
use parking_lot::Mutex;
use std::sync::Arc;

/// Notification for an input dropped after a contained fault.
#[derive(Debug)]
pub struct Ignored<M> {
    /// What went wrong.
    pub error: TransformError,
    /// The input as it was written, before normalization or growth.
    pub input: Input<M>,
    /// The operation that was running, if dispatch got that far.
    pub step: Option<StepKind>,
}

/// Owned summary of an [`Ignored`] notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredRecord<M> {
    /// Rendered error.
    pub error: String,
    /// Whether the fault was a panic.
    pub panicked: bool,
    /// The input as it was written.
    pub input: Input<M>,
    /// The operation that was running.
    pub step: Option<StepKind>,
}

/// Shared collector of ignored notifications.
///
/// Clones share the same log, so one handle can be registered on a stage
/// while another is kept for inspection.
#[derive(Debug)]
pub struct IgnoredLog<M> {
    records: Arc<Mutex<Vec<IgnoredRecord<M>>>>,
}

impl<M> IgnoredLog<M> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of records collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing was ignored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Removes and returns all records.
    pub fn take(&self) -> Vec<IgnoredRecord<M>> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl<M: Clone> IgnoredLog<M> {
    /// Copies out all records.
    #[must_use]
    pub fn records(&self) -> Vec<IgnoredRecord<M>> {
        self.records.lock().clone()
    }
}

impl<M: Clone + Send + 'static> IgnoredLog<M> {
    /// An observer that appends to this log.
    pub fn observer(&self) -> impl FnMut(&Ignored<M>) + Send + 'static {
        let records = Arc::clone(&self.records);
        move |event: &Ignored<M>| {
            records.lock().push(IgnoredRecord {
                error: event.error.to_string(),
                panicked: event.error.is_panic(),
                input: event.input.clone(),
                step: event.step,
            });
        }
    }
}

impl<M> Default for IgnoredLog<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for IgnoredLog<M> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn observer_records_events() {
        let log: IgnoredLog<String> = IgnoredLog::new();
        let mut observer = log.observer();
        observer(&Ignored {
            error: CodecError::NotImplemented("reduce").into(),
            input: Input::Raw(vec![1]),
            step: Some(StepKind::Reduce),
        });
        observer(&Ignored {
            error: TransformError::Panicked("boom".to_owned()),
            input: Input::Raw(vec![2]),
            step: None,
        });

        assert_eq!(log.len(), 2);
        let records = log.records();
        assert_eq!(records[0].error, "reduce() not implemented");
        assert!(!records[0].panicked);
        assert_eq!(records[0].step, Some(StepKind::Reduce));
        assert!(records[1].panicked);
        assert_eq!(records[1].input, Input::Raw(vec![2]));
    }

    #[test]
    fn clones_share_records() {
        let log: IgnoredLog<String> = IgnoredLog::default();
        let registered = log.clone();
        let mut observer = registered.observer();
        observer(&Ignored {
            error: CodecError::other("x").into(),
            input: Input::Raw(Vec::new()),
            step: Some(StepKind::Expand),
        });
        assert!(!log.is_empty());
        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
        assert!(registered.is_empty());
    }
}
