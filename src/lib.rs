//! typed-dict: a reference-counted, type-erased hash map exposed
//! through a statically-typed generic front-end.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: provide a dict usable as a runtime data structure where no
//!   garbage-collected object model exists — keys and values are
//!   fixed-layout records, lifetime is explicit reference counting —
//!   while callers still get a fully type-checked container.
//! - Layers:
//!   - RawDict (`raw`): non-generic engine over fixed-size byte
//!     records; dense insertion-ordered entry region plus a sparse
//!     open-addressing index with perturbation probing. Every outcome
//!     is a `Status` code; the engine never panics for contract-level
//!     failures.
//!   - DictHandle (`handle`): reference-counted ownership of one
//!     engine table with a finalizer run exactly once at last drop;
//!     weak back-references for iterators and views.
//!   - Dict<K, V, S> (`typed_dict`, `views`): the typed surface.
//!     Encodes/decodes records (`Record`), enforces the safe-cast
//!     policy (`SafeCastTo`), computes hashes, and is the sole
//!     translator from status codes to `DictError`.
//!
//! Constraints
//! - Single-threaded: `Rc` + `RefCell` throughout, no locking.
//! - Fixed-size records only; variable-length payloads must be boxed
//!   externally and stored as fixed-size handles.
//! - Insertion order is observable: iteration yields live entries in
//!   the order they were inserted, with a removed-then-reinserted key
//!   appearing at its new, later position.
//! - Clones alias one table; `copy()` is the deep copy.
//!
//! Why this split?
//! - Localize invariants: the engine owns probing, growth and
//!   tombstoning with a closed status-code contract; the typed layer
//!   owns everything type-shaped. The storage core has no generic
//!   parameters at all, so one engine serves every key/value type
//!   pair.
//! - Clear failure boundaries: only the typed layer decides what is a
//!   caller error (`DictError`), what falls back to a default, and
//!   what is an internal-consistency violation (panic).
//!
//! Iteration and mutation
//! - Iterators hold a weak parent reference and a version-snapshot
//!   cursor. Structural mutation (insert of a new key, deletion,
//!   growth) invalidates live cursors; the engine reports
//!   `ErrDictMutated` distinctly from exhaustion and the typed layer
//!   panics rather than silently ending iteration. Value replacement
//!   under an existing key is not structural.
//!
//! Notes and non-goals
//! - No thread-safety, no persistence, no unbounded key/value types.
//! - Hashes are computed once by the typed layer and stored; the
//!   engine never re-invokes user hashing, including during growth.
//! - The default hasher is stable (`foldhash::fast::FixedState`) so a
//!   given key sequence produces a reproducible probe history.

mod cast;
mod error;
pub mod handle;
pub mod raw;
mod record;
mod status;
mod typed_dict;
mod typed_dict_proptest;
mod views;

// Public surface
pub use cast::SafeCastTo;
pub use error::DictError;
pub use record::Record;
pub use status::{Status, DKIX_EMPTY, DKIX_ERROR};
pub use typed_dict::Dict;
pub use views::{Items, ItemsIter, Keys, KeysIter, Values, ValuesIter};
