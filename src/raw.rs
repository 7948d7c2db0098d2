//! RawDict: the type-erased hash table engine.
//!
//! The engine is deliberately non-generic. It stores fixed-size byte
//! records whose sizes are fixed at construction, and reports every
//! outcome through [`Status`] rather than panicking; all typing, hashing
//! and error translation happen in the layers above.
//!
//! Layout is a split table:
//! - a dense entry region (`hashes`/`live`/`bytes`, one record per dense
//!   slot) that preserves insertion order among live entries, and
//! - a sparse power-of-two index mapping probe positions to dense
//!   indices, `DKIX_EMPTY` or `DKIX_DUMMY`.
//!
//! Deletion tombstones the bucket and marks the dense slot dead without
//! compacting, so cursor positions stay meaningful. Growth rebuilds the
//! index and compacts the dense region order-preservingly; every
//! structural mutation bumps `version`, which is how cursors detect that
//! their snapshot went stale.

use core::fmt;

use crate::status::{Status, DKIX_DUMMY, DKIX_EMPTY, DKIX_ERROR};

/// Smallest index capacity; tables start here.
pub const MINSIZE: usize = 8;

const PERTURB_SHIFT: u32 = 5;

/// The key comparator itself failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CmpFailed;

/// Key-equality facility supplied by the host runtime. Comparison may
/// fail; failure maps to `ErrCmpFailed`/`DKIX_ERROR` and leaves the
/// table unchanged.
pub type KeyEq = fn(&[u8], &[u8]) -> Result<bool, CmpFailed>;

fn bytes_eq(a: &[u8], b: &[u8]) -> Result<bool, CmpFailed> {
    Ok(a == b)
}

/// Insert budget for an index of capacity `n`.
fn usable_fraction(n: usize) -> usize {
    (n << 1) / 3
}

/// Probe for the first `DKIX_EMPTY` bucket for `hash`. Dummies are
/// skipped; they are only reclaimed when the index is rebuilt.
fn find_empty_slot(index: &[isize], hash: u64) -> usize {
    let mask = (index.len() - 1) as u64;
    let mut perturb = hash;
    let mut i = hash & mask;
    while index[i as usize] != DKIX_EMPTY {
        perturb >>= PERTURB_SHIFT;
        i = i.wrapping_mul(5).wrapping_add(perturb).wrapping_add(1) & mask;
    }
    i as usize
}

pub struct RawDict {
    key_size: usize,
    val_size: usize,
    /// Live entries.
    used: usize,
    /// Remaining inserts before the index must grow.
    usable: usize,
    /// Sparse index: `DKIX_EMPTY`, `DKIX_DUMMY`, or a dense index.
    index: Vec<isize>,
    /// Stored hash per dense slot; user hashing is never re-invoked.
    hashes: Vec<u64>,
    /// Dense slot is live (not deleted).
    live: Vec<bool>,
    /// Entry records: key bytes then value bytes, one per dense slot.
    bytes: Vec<u8>,
    /// Bumped on every structural mutation.
    version: u64,
    key_eq: KeyEq,
}

impl RawDict {
    /// Allocate a table at minimum capacity with bytewise key equality.
    pub fn new_minsize(key_size: usize, val_size: usize) -> Result<Self, Status> {
        Self::with_key_eq(key_size, val_size, bytes_eq)
    }

    /// Allocate a table at minimum capacity with a caller-supplied key
    /// comparator.
    pub fn with_key_eq(key_size: usize, val_size: usize, key_eq: KeyEq) -> Result<Self, Status> {
        let mut index = Vec::new();
        index
            .try_reserve_exact(MINSIZE)
            .map_err(|_| Status::ErrNoMemory)?;
        index.resize(MINSIZE, DKIX_EMPTY);
        Ok(Self {
            key_size,
            val_size,
            used: 0,
            usable: usable_fraction(MINSIZE),
            index,
            hashes: Vec::new(),
            live: Vec::new(),
            bytes: Vec::new(),
            version: 0,
            key_eq,
        })
    }

    /// Number of live entries. O(1).
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn val_size(&self) -> usize {
        self.val_size
    }

    /// Structural-mutation counter observed by [`RawCursor`].
    pub fn version(&self) -> u64 {
        self.version
    }

    fn entry_size(&self) -> usize {
        self.key_size + self.val_size
    }

    fn key_at(&self, ix: usize) -> &[u8] {
        let off = ix * self.entry_size();
        &self.bytes[off..off + self.key_size]
    }

    fn val_at(&self, ix: usize) -> &[u8] {
        let off = ix * self.entry_size() + self.key_size;
        &self.bytes[off..off + self.val_size]
    }

    /// Probe for an entry equal to `key` under `hash`. Returns the dense
    /// index, `DKIX_EMPTY`, or `DKIX_ERROR` on comparator failure.
    fn probe(&self, key: &[u8], hash: u64) -> isize {
        let mask = (self.index.len() - 1) as u64;
        let mut perturb = hash;
        let mut i = hash & mask;
        loop {
            let ix = self.index[i as usize];
            if ix == DKIX_EMPTY {
                return DKIX_EMPTY;
            }
            if ix >= 0 {
                let e = ix as usize;
                debug_assert!(self.live[e], "index bucket points at a dead slot");
                if self.hashes[e] == hash {
                    match (self.key_eq)(self.key_at(e), key) {
                        Ok(true) => return ix,
                        Ok(false) => {}
                        Err(CmpFailed) => return DKIX_ERROR,
                    }
                }
            }
            perturb >>= PERTURB_SHIFT;
            i = i.wrapping_mul(5).wrapping_add(perturb).wrapping_add(1) & mask;
        }
    }

    /// Probe for the bucket that holds dense index `ix` under `hash`.
    /// `None` means the (hash, ix) pair does not address a linked entry.
    fn find_bucket(&self, hash: u64, ix: isize) -> Option<usize> {
        let mask = (self.index.len() - 1) as u64;
        let mut perturb = hash;
        let mut i = hash & mask;
        loop {
            match self.index[i as usize] {
                DKIX_EMPTY => return None,
                slot if slot == ix => return Some(i as usize),
                _ => {}
            }
            perturb >>= PERTURB_SHIFT;
            i = i.wrapping_mul(5).wrapping_add(perturb).wrapping_add(1) & mask;
        }
    }

    /// Look up `key` under `hash`.
    ///
    /// Returns the dense index plus the value bytes when found,
    /// `(DKIX_EMPTY, None)` when absent, `(DKIX_ERROR, None)` when the
    /// comparator fails.
    pub fn lookup(&self, key: &[u8], hash: u64) -> (isize, Option<&[u8]>) {
        debug_assert_eq!(key.len(), self.key_size);
        match self.probe(key, hash) {
            ix if ix >= 0 => (ix, Some(self.val_at(ix as usize))),
            ix => (ix, None),
        }
    }

    /// Insert `key -> val` under `hash`.
    ///
    /// Overwrites the value in place when an equal key exists
    /// (`OkReplaced`); otherwise appends a new dense entry (`Ok`).
    /// Growth failure (`ErrNoMemory`) and comparator failure
    /// (`ErrCmpFailed`) leave the table unchanged.
    pub fn insert(&mut self, key: &[u8], hash: u64, val: &[u8]) -> Status {
        debug_assert_eq!(key.len(), self.key_size);
        debug_assert_eq!(val.len(), self.val_size);
        if self.usable == 0 {
            if let Err(status) = self.grow() {
                return status;
            }
        }
        match self.probe(key, hash) {
            DKIX_ERROR => return Status::ErrCmpFailed,
            ix if ix >= 0 => {
                let off = ix as usize * self.entry_size() + self.key_size;
                self.bytes[off..off + self.val_size].copy_from_slice(val);
                return Status::OkReplaced;
            }
            _ => {}
        }
        if self.hashes.try_reserve(1).is_err()
            || self.live.try_reserve(1).is_err()
            || self.bytes.try_reserve(self.entry_size()).is_err()
        {
            return Status::ErrNoMemory;
        }
        let ix = self.hashes.len();
        self.hashes.push(hash);
        self.live.push(true);
        self.bytes.extend_from_slice(key);
        self.bytes.extend_from_slice(val);
        let slot = find_empty_slot(&self.index, hash);
        self.index[slot] = ix as isize;
        self.used += 1;
        self.usable -= 1;
        self.version += 1;
        Status::Ok
    }

    /// Remove the dense entry at `ix`, previously located via `lookup`
    /// under `hash`. The bucket is tombstoned and the dense slot marked
    /// dead; no compaction. A stale (hash, ix) pair yields
    /// `ErrDictMutated`.
    pub fn delitem(&mut self, hash: u64, ix: isize) -> Status {
        let e = match usize::try_from(ix) {
            Ok(e) if e < self.hashes.len() && self.live[e] && self.hashes[e] == hash => e,
            _ => return Status::ErrDictMutated,
        };
        let bucket = match self.find_bucket(hash, ix) {
            Some(bucket) => bucket,
            None => return Status::ErrDictMutated,
        };
        self.index[bucket] = DKIX_DUMMY;
        self.live[e] = false;
        self.used -= 1;
        self.version += 1;
        Status::Ok
    }

    /// Remove and return an arbitrary live entry: the one nearest the
    /// dense tail, which is the cheapest to find.
    pub fn popitem(&mut self) -> (Status, Option<(&[u8], &[u8])>) {
        if self.used == 0 {
            return (Status::ErrDictEmpty, None);
        }
        let e = self
            .live
            .iter()
            .rposition(|&l| l)
            .expect("used > 0 implies a live dense slot");
        let hash = self.hashes[e];
        let bucket = self
            .find_bucket(hash, e as isize)
            .expect("live entry must be linked in the index");
        self.index[bucket] = DKIX_DUMMY;
        self.live[e] = false;
        self.used -= 1;
        self.version += 1;
        let off = e * self.entry_size();
        let record = &self.bytes[off..off + self.entry_size()];
        let (key, val) = record.split_at(self.key_size);
        (Status::Ok, Some((key, val)))
    }

    /// Rebuild the index at the next capacity and compact the dense
    /// region, preserving the relative order of live entries. On
    /// allocation failure nothing visible changes.
    fn grow(&mut self) -> Result<(), Status> {
        let target = self.used * 3;
        let mut new_size = MINSIZE;
        while new_size <= target {
            new_size <<= 1;
        }

        let mut index = Vec::new();
        let mut hashes = Vec::new();
        let mut live = Vec::new();
        let mut bytes = Vec::new();
        if index.try_reserve_exact(new_size).is_err()
            || hashes.try_reserve_exact(self.used).is_err()
            || live.try_reserve_exact(self.used).is_err()
            || bytes.try_reserve_exact(self.used * self.entry_size()).is_err()
        {
            return Err(Status::ErrNoMemory);
        }
        index.resize(new_size, DKIX_EMPTY);

        let entry_size = self.entry_size();
        for e in 0..self.hashes.len() {
            if !self.live[e] {
                continue;
            }
            let ix = hashes.len();
            hashes.push(self.hashes[e]);
            live.push(true);
            bytes.extend_from_slice(&self.bytes[e * entry_size..(e + 1) * entry_size]);
            let slot = find_empty_slot(&index, self.hashes[e]);
            index[slot] = ix as isize;
        }

        self.index = index;
        self.hashes = hashes;
        self.live = live;
        self.bytes = bytes;
        self.usable = usable_fraction(new_size) - self.used;
        self.version += 1;
        Ok(())
    }

    /// Write a human-readable listing of live entries. Diagnostic only;
    /// not part of the operational contract.
    pub fn dump(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(
            w,
            "RawDict {{ used: {}, capacity: {}, key_size: {}, val_size: {} }}",
            self.used,
            self.index.len(),
            self.key_size,
            self.val_size,
        )?;
        for e in 0..self.hashes.len() {
            if !self.live[e] {
                continue;
            }
            writeln!(
                w,
                "  [{e}] hash={:#018x} key={:02x?} val={:02x?}",
                self.hashes[e],
                self.key_at(e),
                self.val_at(e),
            )?;
        }
        Ok(())
    }
}

/// Engine half of the iterator state machine: a resumable position into
/// the dense entry region plus the version snapshot it was created
/// against. The cursor holds no reference to its table; parent liveness
/// is the typed layer's weak-handle concern.
#[derive(Copy, Clone, Debug)]
pub struct RawCursor {
    pos: usize,
    version: u64,
}

impl RawCursor {
    /// Snapshot `dict`'s current dense storage, positioned at the start.
    pub fn new(dict: &RawDict) -> Self {
        Self {
            pos: 0,
            version: dict.version,
        }
    }

    /// Advance to the next live entry of `dict` in dense (insertion)
    /// order.
    ///
    /// `ErrDictMutated` when `dict` was structurally mutated since the
    /// snapshot; `ErrIterExhausted` past the last live entry. Value
    /// replacement is not a structural mutation.
    pub fn next<'d>(&mut self, dict: &'d RawDict) -> (Status, Option<(&'d [u8], &'d [u8])>) {
        if dict.version != self.version {
            return (Status::ErrDictMutated, None);
        }
        while self.pos < dict.hashes.len() {
            let e = self.pos;
            self.pos += 1;
            if dict.live[e] {
                return (Status::Ok, Some((dict.key_at(e), dict.val_at(e))));
            }
        }
        (Status::ErrIterExhausted, None)
    }
}
