//! Caller-visible errors of the typed layer.
//!
//! The engine reports [`Status`](crate::Status) codes; only the typed
//! layer turns them into errors, and only these three conditions are
//! recoverable. Every other status reaching the typed layer is an
//! internal-consistency violation and panics there.

/// Error returned by fallible dict operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DictError {
    /// The key is not present (also reported by `popitem` on an empty
    /// dict).
    #[error("key not found")]
    KeyNotFound,

    /// The key comparator failed while probing.
    #[error("key comparison failed")]
    CmpFailed,

    /// Allocating table storage failed.
    #[error("out of memory allocating dict storage")]
    NoMemory,
}
