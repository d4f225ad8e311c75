//! Stand-in for `core::cell::SyncUnsafeCell`, which is still unstable.
//!
//! A bucket needs to hand out `&mut Vec<Wrapper<T>>` to several worker
//! threads at once, one per type, from a single shared `&ComponentStore`.
//! `UnsafeCell` doesn't implement `Sync` on its own (to stop accidental
//! misuse); this wrapper opts back in and leaves synchronization to the
//! caller.

use std::cell::UnsafeCell;

#[repr(transparent)]
pub struct SyncUnsafeCell<T>(UnsafeCell<T>);

// SAFETY: proper synchronization (the dispatcher's slot-partitioning
// argument) is left to the caller of `as_mut_unchecked`.
unsafe impl<T: Send> Sync for SyncUnsafeCell<T> {}

impl<T> SyncUnsafeCell<T> {
    pub fn new(value: T) -> Self {
        SyncUnsafeCell(UnsafeCell::new(value))
    }

    /// Safe exclusive access: requires `&mut self`, so the borrow checker
    /// already guarantees no other reference exists.
    pub fn get_mut(&mut self) -> &mut T {
        self.0.get_mut()
    }

    /// Shared read for contexts that are not running a concurrent dispatch
    /// (i.e. reached through an outer `&mut ComponentStore`/`&mut Manager`
    /// reborrow). Single-threaded callers only.
    pub fn as_ref(&self) -> &T {
        // SAFETY: reachable only while the caller holds (or has reborrowed
        // from) an exclusive reference to the enclosing store, so no
        // concurrent writer can exist.
        unsafe { &*self.0.get() }
    }

    /// Unchecked exclusive access from a shared `&self`.
    ///
    /// # Safety
    ///
    /// The caller must guarantee no other live reference (mutable or
    /// shared) to the same `T` exists for the duration of the returned
    /// borrow. The dispatcher upholds this by partitioning entities into
    /// disjoint slot ranges before handing out per-type references: each
    /// worker gets exclusive write access to the component references the
    /// dispatcher handed it.
    pub unsafe fn as_mut_unchecked(&self) -> &mut T {
        unsafe { &mut *self.0.get() }
    }
}

impl<T: Default> Default for SyncUnsafeCell<T> {
    fn default() -> Self {
        SyncUnsafeCell::new(T::default())
    }
}
