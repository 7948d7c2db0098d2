//! Engine status codes and dense-index sentinels.
//!
//! The engine layer never panics for contract-level failures; every
//! operation reports one of these codes and the typed layer is the sole
//! translator into caller-visible errors.

/// Outcome of an engine operation.
///
/// The numeric values are part of the engine contract: `Ok`/`OkReplaced`
/// are the two success codes, everything negative is a failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum Status {
    /// Operation succeeded.
    Ok = 0,
    /// Insert found an equal key and overwrote its value in place.
    OkReplaced = 1,
    /// Storage allocation failed; the table is unchanged.
    ErrNoMemory = -1,
    /// A cursor observed a structural mutation of its table.
    ErrDictMutated = -2,
    /// A cursor ran past the last live entry.
    ErrIterExhausted = -3,
    /// `popitem` on a table with no live entries.
    ErrDictEmpty = -4,
    /// The key comparator itself failed; the table is unchanged.
    ErrCmpFailed = -5,
}

impl Status {
    /// Both `Ok` and `OkReplaced` count as success.
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, Status::Ok | Status::OkReplaced)
    }
}

/// Dense-index result of [`RawDict::lookup`](crate::raw::RawDict::lookup):
/// no entry with an equal key exists.
pub const DKIX_EMPTY: isize = -1;

/// Index-table slot whose entry was deleted; probing continues past it.
/// Internal to the index table, never returned from `lookup`.
pub(crate) const DKIX_DUMMY: isize = -2;

/// The key comparator failed during a probe. Values below [`DKIX_EMPTY`]
/// must never escape the typed layer; observing one there is an
/// internal-consistency violation.
pub const DKIX_ERROR: isize = -3;
