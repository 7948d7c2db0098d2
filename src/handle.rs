//! Reference-counted ownership of one engine table.
//!
//! A table is owned by exactly one [`DictBox`], shared behind `Rc`:
//! cloning a [`DictHandle`] is the acquire operation, dropping the last
//! one frees the table, and the registered finalizer runs exactly once
//! from the box's `Drop` before storage is released. Iterators and views
//! hold a [`WeakDictHandle`] so they never extend the table's lifetime.
//!
//! Single-threaded by construction (`Rc` + `RefCell`), like the rest of
//! the crate.

use core::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::raw::RawDict;

/// Cleanup hook run once when the last strong handle is dropped, before
/// the table's storage is released.
pub type Finalizer = fn(&mut RawDict);

pub(crate) struct DictBox {
    raw: RefCell<RawDict>,
    finalizer: Cell<Option<Finalizer>>,
}

impl DictBox {
    pub(crate) fn raw(&self) -> &RefCell<RawDict> {
        &self.raw
    }
}

impl Drop for DictBox {
    fn drop(&mut self) {
        if let Some(finalizer) = self.finalizer.take() {
            finalizer(self.raw.get_mut());
        }
    }
}

/// Strong reference to a shared engine table.
pub struct DictHandle {
    inner: Rc<DictBox>,
}

impl DictHandle {
    /// Take ownership of an engine table.
    pub fn new(raw: RawDict) -> Self {
        Self {
            inner: Rc::new(DictBox {
                raw: RefCell::new(raw),
                finalizer: Cell::new(None),
            }),
        }
    }

    /// Register the cleanup hook. Replaces any previously registered one;
    /// only the hook registered at last-drop time runs.
    pub fn set_finalizer(&self, finalizer: Finalizer) {
        self.inner.finalizer.set(Some(finalizer));
    }

    /// The shared engine table.
    pub fn raw(&self) -> &RefCell<RawDict> {
        &self.inner.raw
    }

    /// Back-reference for iterators and views; never keeps the table
    /// alive.
    pub fn downgrade(&self) -> WeakDictHandle {
        WeakDictHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// True when both handles alias the same table.
    pub fn ptr_eq(&self, other: &DictHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[cfg(test)]
    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }
}

impl Clone for DictHandle {
    /// Acquire: one more strong reference to the same table.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Weak back-reference held by iterators and views.
pub struct WeakDictHandle {
    inner: Weak<DictBox>,
}

impl WeakDictHandle {
    /// `None` once the last strong handle has been dropped.
    pub(crate) fn upgrade(&self) -> Option<Rc<DictBox>> {
        self.inner.upgrade()
    }
}

impl Clone for WeakDictHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawDict;
    use std::cell::Cell;

    thread_local! {
        static FINALIZED: Cell<u32> = const { Cell::new(0) };
    }

    fn counting_finalizer(_raw: &mut RawDict) {
        FINALIZED.with(|c| c.set(c.get() + 1));
    }

    fn new_handle() -> DictHandle {
        DictHandle::new(RawDict::new_minsize(8, 8).expect("minsize alloc"))
    }

    /// Invariant: the finalizer runs exactly once, at last-drop, no
    /// matter how many aliases existed.
    #[test]
    fn finalizer_runs_exactly_once_at_last_drop() {
        FINALIZED.with(|c| c.set(0));
        let h = new_handle();
        h.set_finalizer(counting_finalizer);
        let h2 = h.clone();
        let h3 = h2.clone();
        assert_eq!(h.strong_count(), 3);

        drop(h);
        drop(h3);
        FINALIZED.with(|c| assert_eq!(c.get(), 0));

        drop(h2);
        FINALIZED.with(|c| assert_eq!(c.get(), 1));
    }

    /// Invariant: a weak handle never keeps the table alive and stops
    /// upgrading once the last strong handle is gone.
    #[test]
    fn weak_handle_does_not_extend_lifetime() {
        let h = new_handle();
        let w = h.downgrade();
        assert!(w.upgrade().is_some());
        drop(h);
        assert!(w.upgrade().is_none());
    }

    /// Aliases observe each other's mutations; ptr_eq reflects aliasing.
    #[test]
    fn aliases_share_one_table() {
        let h = new_handle();
        let h2 = h.clone();
        assert!(h.ptr_eq(&h2));
        assert!(!h.ptr_eq(&new_handle()));

        let key = 7u64.to_le_bytes();
        let val = 9u64.to_le_bytes();
        h.raw().borrow_mut().insert(&key, 7, &val);
        assert_eq!(h2.raw().borrow().len(), 1);
    }
}
