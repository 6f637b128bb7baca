//! Error types returned by fallible deque operations.

use core::fmt;
use std::collections::TryReserveError;

/// Errors raised while building or growing a [`SegmentedDeque`](crate::SegmentedDeque).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A block must hold at least one element, which takes two slots.
    #[error("block capacity must be at least 2, got {0}")]
    InvalidBlockCapacity(usize),
    /// A block or the block directory could not be allocated.
    #[error("failed to allocate {what}: {source}")]
    OutOfMemory {
        what: &'static str,
        source: TryReserveError,
    },
}

impl Error {
    pub(crate) fn out_of_memory(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Error::OutOfMemory { what, source }
    }
}

/// A failed push. The deque is left untouched and the rejected element is handed back.
#[derive(thiserror::Error)]
#[error("failed to push element: {error}")]
pub struct PushError<T> {
    value: T,
    #[source]
    error: Error,
}

impl<T> PushError<T> {
    pub(crate) fn new(value: T, error: Error) -> Self {
        Self { value, error }
    }

    /// The reason the push failed.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Recovers the element that could not be pushed.
    pub fn into_inner(self) -> T {
        self.value
    }
}

// Hide the contained element
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
