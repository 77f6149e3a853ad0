//! Error types for tree iteration

use thiserror::Error;

/// Result type for detached iterator steps
pub type Result<T> = std::result::Result<T, IterError>;

/// Terminal conditions reported by [`TreeIterator`](crate::cursor::TreeIterator).
///
/// Every variant is sticky: once an iterator has returned one, it returns the same error from
/// every later call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterError {
    /// Nothing left to visit
    #[error("iterator exhausted")]
    Exhausted,

    /// The tree changed shape after the iterator was created
    #[error("concurrent modification: expected tree version {expected}, found {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    /// The iterator was driven with a tree other than the one that created it
    #[error("iterator belongs to a different tree")]
    ForeignTree,
}

impl IterError {
    /// Whether this error means the iterator was invalidated, as opposed to simply finishing.
    pub fn is_invalidated(&self) -> bool {
        !matches!(self, IterError::Exhausted)
    }
}
