//! Dict: the statically-typed front-end over the type-erased engine.
//!
//! A `Dict<K, V>` declares its key and value types at creation and keeps
//! them for its whole lifetime. Keys, values and explicit defaults cross
//! into the table only through the safe-cast policy ([`SafeCastTo`]),
//! hashing happens here (the engine only ever sees precomputed hashes),
//! and engine status codes are translated into [`DictError`] here and
//! nowhere else. Statuses and dense indices that cannot occur in correct
//! operation panic: they indicate a bug in the engine or a record-size
//! mismatch, not a caller mistake.
//!
//! `Clone` aliases: clones share one table through the reference-counted
//! handle and observe each other's mutations; [`Dict::copy`] is the deep
//! copy. Mutating operations take `&self` for that reason — interior
//! mutability through the shared handle, as aliasing semantics require.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use crate::cast::SafeCastTo;
use crate::error::DictError;
use crate::handle::{DictHandle, Finalizer};
use crate::raw::{CmpFailed, RawDict};
use crate::record::Record;
use crate::status::{Status, DKIX_EMPTY};
use crate::views::{Items, Keys, KeysIter, Values};

/// Key equality handed to the engine: decode both records and compare.
/// Monomorphized per key type so the engine stays non-generic.
fn key_eq_thunk<K: Record + Eq>(a: &[u8], b: &[u8]) -> Result<bool, CmpFailed> {
    Ok(K::read_from(a) == K::read_from(b))
}

fn encode<R: Record>(value: &R) -> Vec<u8> {
    let mut buf = vec![0u8; R::BYTES];
    value.write_to(&mut buf);
    buf
}

/// A typed mapping over fixed-layout records.
///
/// `K` and `V` must be concrete fixed-size [`Record`] types; their byte
/// sizes are derived here and fix the engine's record layout at
/// construction. The hasher is the crate-default stable
/// [`foldhash::fast::FixedState`] unless overridden via `with_hasher`.
pub struct Dict<K, V, S = foldhash::fast::FixedState> {
    handle: DictHandle,
    hasher: S,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> Dict<K, V>
where
    K: Record + Hash + Eq,
    V: Record,
{
    /// Create an empty dict at minimum capacity.
    ///
    /// Panics on allocation failure; use [`Dict::try_new`] to observe it.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn try_new() -> Result<Self, DictError> {
        Self::try_with_hasher(Default::default())
    }
}

impl<K, V> Default for Dict<K, V>
where
    K: Record + Hash + Eq,
    V: Record,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Record + Hash + Eq,
    V: Record,
    S: BuildHasher + Clone + Default,
{
    /// Create an empty dict with an explicit hasher.
    ///
    /// Panics on allocation failure; use [`Dict::try_with_hasher`] to
    /// observe it.
    pub fn with_hasher(hasher: S) -> Self {
        Self::try_with_hasher(hasher).expect("failed to allocate dict storage")
    }

    pub fn try_with_hasher(hasher: S) -> Result<Self, DictError> {
        let raw = RawDict::with_key_eq(K::BYTES, V::BYTES, key_eq_thunk::<K>)
            .map_err(|_| DictError::NoMemory)?;
        Ok(Self {
            handle: DictHandle::new(raw),
            hasher,
            _marker: PhantomData,
        })
    }

    fn hash_key(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.handle.raw().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a cleanup hook run once when the last aliasing dict is
    /// dropped, before table storage is released. Useful when stored
    /// records are handles to externally boxed payloads.
    pub fn set_finalizer(&self, finalizer: Finalizer) {
        self.handle.set_finalizer(finalizer);
    }

    /// Insert `key -> value`, overwriting the value if the key is
    /// already present.
    pub fn insert<Q, W>(&self, key: Q, value: W) -> Result<(), DictError>
    where
        Q: SafeCastTo<K>,
        W: SafeCastTo<V>,
    {
        let key = key.safe_cast();
        let value = value.safe_cast();
        let hash = self.hash_key(&key);
        let status = self
            .handle
            .raw()
            .borrow_mut()
            .insert(&encode(&key), hash, &encode(&value));
        match status {
            Status::Ok | Status::OkReplaced => Ok(()),
            Status::ErrCmpFailed => Err(DictError::CmpFailed),
            Status::ErrNoMemory => Err(DictError::NoMemory),
            other => panic!("internal dict error during insert: {other:?}"),
        }
    }

    /// Look up `key`; `None` when absent.
    pub fn get<Q>(&self, key: Q) -> Option<V>
    where
        Q: SafeCastTo<K>,
    {
        let key = key.safe_cast();
        let hash = self.hash_key(&key);
        let raw = self.handle.raw().borrow();
        let (ix, val) = raw.lookup(&encode(&key), hash);
        if ix == DKIX_EMPTY {
            return None;
        }
        assert!(ix > DKIX_EMPTY, "internal dict error during lookup");
        Some(V::read_from(val.expect("found entries carry value bytes")))
    }

    /// Look up `key`, falling back to an explicit default. The default
    /// goes through the same safe-cast policy as stored values.
    pub fn get_or<Q, D>(&self, key: Q, default: D) -> V
    where
        Q: SafeCastTo<K>,
        D: SafeCastTo<V>,
    {
        self.get(key).unwrap_or_else(|| default.safe_cast())
    }

    pub fn contains_key<Q>(&self, key: Q) -> bool
    where
        Q: SafeCastTo<K>,
    {
        let key = key.safe_cast();
        let hash = self.hash_key(&key);
        let raw = self.handle.raw().borrow();
        let (ix, _) = raw.lookup(&encode(&key), hash);
        assert!(ix >= DKIX_EMPTY, "internal dict error during lookup");
        ix > DKIX_EMPTY
    }

    /// Remove `key` and return its value; `KeyNotFound` when absent.
    pub fn pop<Q>(&self, key: Q) -> Result<V, DictError>
    where
        Q: SafeCastTo<K>,
    {
        let key = key.safe_cast();
        let hash = self.hash_key(&key);
        let mut raw = self.handle.raw().borrow_mut();
        let (ix, val) = raw.lookup(&encode(&key), hash);
        if ix == DKIX_EMPTY {
            return Err(DictError::KeyNotFound);
        }
        assert!(ix > DKIX_EMPTY, "internal dict error during lookup");
        let value = V::read_from(val.expect("found entries carry value bytes"));
        let status = raw.delitem(hash, ix);
        assert_eq!(status, Status::Ok, "internal dict error during delitem");
        Ok(value)
    }

    /// Remove `key`, falling back to an explicit default when absent.
    pub fn pop_or<Q, D>(&self, key: Q, default: D) -> V
    where
        Q: SafeCastTo<K>,
        D: SafeCastTo<V>,
    {
        match self.pop(key) {
            Ok(value) => value,
            Err(_) => default.safe_cast(),
        }
    }

    /// Delete `key`, discarding its value; `KeyNotFound` when absent.
    pub fn remove<Q>(&self, key: Q) -> Result<(), DictError>
    where
        Q: SafeCastTo<K>,
    {
        self.pop(key).map(|_| ())
    }

    /// Remove and return an arbitrary entry; `KeyNotFound` when empty.
    pub fn popitem(&self) -> Result<(K, V), DictError> {
        let mut raw = self.handle.raw().borrow_mut();
        match raw.popitem() {
            (Status::Ok, Some((key, val))) => Ok((K::read_from(key), V::read_from(val))),
            (Status::ErrDictEmpty, _) => Err(DictError::KeyNotFound),
            (other, _) => panic!("internal dict error during popitem: {other:?}"),
        }
    }

    /// Insert `default` under `key` only if `key` is absent. Membership
    /// test then conditional insert; not atomic against aliased
    /// mutation in between.
    pub fn setdefault<Q, D>(&self, key: Q, default: D) -> Result<(), DictError>
    where
        Q: SafeCastTo<K>,
        D: SafeCastTo<V>,
    {
        let key = key.safe_cast();
        if !self.contains_key(key) {
            self.insert(key, default.safe_cast())?;
        }
        Ok(())
    }

    /// Remove every entry. There is no engine-level bulk clear; this
    /// pops until empty.
    pub fn clear(&self) {
        while !self.is_empty() {
            self.popitem().expect("non-empty dict always pops an item");
        }
    }

    /// Structurally independent copy with the same declared types,
    /// populated in iteration order.
    pub fn copy(&self) -> Self {
        let out = Self::with_hasher(self.hasher.clone());
        for (key, value) in self.items() {
            out.insert(key, value)
                .expect("reinserting previously stored records cannot fail");
        }
        out
    }

    /// Keys view. Iterating the dict directly iterates this view.
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(self.handle.downgrade())
    }

    /// Values view.
    pub fn values(&self) -> Values<K, V> {
        Values::new(self.handle.downgrade())
    }

    /// Items view, yielding `(key, value)` pairs.
    pub fn items(&self) -> Items<K, V> {
        Items::new(self.handle.downgrade())
    }

    /// Iterate the keys of the dict in insertion order (the default
    /// view, like the items/values views, snapshots current storage).
    pub fn iter(&self) -> KeysIter<K, V> {
        self.keys().into_iter()
    }

    /// True when both dicts alias the same underlying table.
    pub fn aliases(&self, other: &Self) -> bool {
        self.handle.ptr_eq(&other.handle)
    }
}

/// Aliasing clone: one more strong reference to the same table.
impl<K, V, S: Clone> Clone for Dict<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            hasher: self.hasher.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dict<K, V, S>
where
    K: Record + Hash + Eq,
    V: Record,
    S: BuildHasher + Clone + Default,
{
    type Item = K;
    type IntoIter = KeysIter<K, V>;

    fn into_iter(self) -> KeysIter<K, V> {
        self.iter()
    }
}

/// Content equality, order-independent: equal lengths and, for every
/// left-side pair, the key cast to the right side's key type maps to an
/// equal value there. Comparing against a non-dict is a type error
/// rather than `false`.
impl<K, V, S, K2, V2, S2> PartialEq<Dict<K2, V2, S2>> for Dict<K, V, S>
where
    K: Record + Hash + Eq + SafeCastTo<K2>,
    V: Record + PartialEq<V2>,
    S: BuildHasher + Clone + Default,
    K2: Record + Hash + Eq,
    V2: Record,
    S2: BuildHasher + Clone + Default,
{
    fn eq(&self, other: &Dict<K2, V2, S2>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for (key, value) in self.items() {
            match other.get(key.safe_cast()) {
                Some(other_value) if value == other_value => {}
                _ => return false,
            }
        }
        true
    }
}

impl<K, V, S> fmt::Debug for Dict<K, V, S>
where
    K: Record + Hash + Eq + fmt::Debug,
    V: Record + fmt::Debug,
    S: BuildHasher + Clone + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}
