//! System dispatcher: signature-to-bitset compilation, per-entity tuple
//! assembly, chunked parallel execution over the manager's worker pool.
//!
//! Rust closures already capture their environment by reference, so a
//! variant of `apply_system` that binds extra caller-owned references as
//! fixed arguments for every invocation needs no separate method here: a
//! caller who wants extra state just closes over it, and `Fn(...) + Sync`
//! is exactly the bound that makes sharing that capture across workers
//! sound.
//!
//! Arity is capped at 4 components per system. A macro per arity scales to
//! any width, but 4 covers every scenario this crate is tested against, and
//! the overload family below is hand expanded rather than macro-generated,
//! so the cap is kept small deliberately.

#[cfg(test)]
mod tests;

use crate::component::Component;
use crate::interface::Interface;
use crate::manager::Manager;
use crate::typelist::{BucketAccess, ComponentList};

/// Entity-count cutoff above which `apply_system_*` partitions work across
/// the worker pool instead of running inline. `Manager::set_parallel_threshold`
/// overrides this default per instance.
pub const PARALLEL_THRESHOLD: usize = 300;

/// Extends a borrow to `'static` so it can be captured by a task submitted
/// to the worker pool, whose `add_task` bound requires `'static`.
///
/// # Safety
///
/// Every task built from a lifetime-extended reference here is joined
/// before the enclosing `dispatch` call returns, so the real borrow never
/// outlives its referent in practice — the manager is not touched again
/// until every task this dispatch spawned has completed, preserving a
/// happens-before edge across dispatches.
unsafe fn extend_lifetime<'a, T: ?Sized>(r: &'a T) -> &'static T {
    unsafe { std::mem::transmute(r) }
}

impl<L: ComponentList> Manager<L> {
    /// Runs `body(self, slot)` once for every slot whose mask satisfies
    /// `(req & mask[slot]) == req`, either inline or partitioned across the
    /// worker pool depending on `self.len()` vs `self.parallel_threshold`.
    ///
    /// Blocks until every partition has finished before returning, so a
    /// caller never observes a dispatch as complete while a worker is still
    /// writing to it.
    pub(crate) fn dispatch<F>(&self, req: u64, body: F)
    where
        F: Fn(&Self, usize) + Sync,
    {
        let count = self.ids.len();
        let workers = self.pool.size();
        if count > self.parallel_threshold && workers > 1 {
            let chunk_len = (count + workers - 1) / workers;
            // SAFETY: see `extend_lifetime`; every handle below is joined
            // in this same function before it returns.
            let self_static: &'static Self = unsafe { extend_lifetime(self) };
            let body_static: &'static F = unsafe { extend_lifetime(&body) };
            let handles: Vec<_> = (0..workers)
                .filter_map(|w| {
                    let start = w * chunk_len;
                    if start >= count {
                        return None;
                    }
                    let end = (start + chunk_len).min(count);
                    Some(self.pool.add_task(move |_idx| {
                        for slot in start..end {
                            if (req & self_static.mask[slot]) == req {
                                body_static(self_static, slot);
                            }
                        }
                    }))
                })
                .collect();
            for h in handles {
                h.join();
            }
        } else {
            for slot in 0..count {
                if (req & self.mask[slot]) == req {
                    body(self, slot);
                }
            }
        }
    }

    fn interface_for(&self, slot: usize) -> Interface<'_> {
        let id = self.ids[slot];
        // SAFETY: the dispatcher only ever reaches this from a slot range
        // exclusive to the calling worker (see `dispatch`), so no other
        // live reference to `flags[slot]` exists concurrently.
        let flags_vec = unsafe { self.flags.as_mut_unchecked() };
        Interface::new(id, slot, &mut flags_vec[slot], &self.mask[slot])
    }

    /// Calls `f` once per entity, regardless of components, with only the
    /// per-entity interface handle.
    pub fn apply_system_interface_only<F>(&self, f: F)
    where
        F: Fn(Interface<'_>) + Sync,
    {
        self.dispatch(0, |mgr, slot| {
            f(mgr.interface_for(slot));
        });
    }

    pub fn apply_system_1<T0, I0, F>(&self, f: F)
    where
        L::Storage: BucketAccess<T0, I0>,
        T0: Component,
        F: Fn(&mut T0) + Sync,
    {
        let req = 1u64 << Self::index_of::<T0, I0>();
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            if let Some(w0) = bucket0.iter_mut().find(|w| w.owner() == id) {
                f(w0.payload_mut());
            }
        });
    }

    pub fn apply_system_1_with_interface<T0, I0, F>(&self, f: F)
    where
        L::Storage: BucketAccess<T0, I0>,
        T0: Component,
        F: Fn(Interface<'_>, &mut T0) + Sync,
    {
        let req = 1u64 << Self::index_of::<T0, I0>();
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            if let Some(w0) = bucket0.iter_mut().find(|w| w.owner() == id) {
                f(mgr.interface_for(slot), w0.payload_mut());
            }
        });
    }

    pub fn apply_system_2<T0, I0, T1, I1, F>(&self, f: F)
    where
        L::Storage: BucketAccess<T0, I0> + BucketAccess<T1, I1>,
        T0: Component,
        T1: Component,
        F: Fn(&mut T0, &mut T1) + Sync,
    {
        let req = (1u64 << Self::index_of::<T0, I0>()) | (1u64 << Self::index_of::<T1, I1>());
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            let bucket1 = unsafe { mgr.store.bucket_mut_unchecked::<T1, I1>() };
            let w0 = bucket0.iter_mut().find(|w| w.owner() == id);
            let w1 = bucket1.iter_mut().find(|w| w.owner() == id);
            if let (Some(w0), Some(w1)) = (w0, w1) {
                f(w0.payload_mut(), w1.payload_mut());
            }
        });
    }

    pub fn apply_system_2_with_interface<T0, I0, T1, I1, F>(&self, f: F)
    where
        L::Storage: BucketAccess<T0, I0> + BucketAccess<T1, I1>,
        T0: Component,
        T1: Component,
        F: Fn(Interface<'_>, &mut T0, &mut T1) + Sync,
    {
        let req = (1u64 << Self::index_of::<T0, I0>()) | (1u64 << Self::index_of::<T1, I1>());
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            let bucket1 = unsafe { mgr.store.bucket_mut_unchecked::<T1, I1>() };
            let w0 = bucket0.iter_mut().find(|w| w.owner() == id);
            let w1 = bucket1.iter_mut().find(|w| w.owner() == id);
            if let (Some(w0), Some(w1)) = (w0, w1) {
                f(mgr.interface_for(slot), w0.payload_mut(), w1.payload_mut());
            }
        });
    }

    pub fn apply_system_3<T0, I0, T1, I1, T2, I2, F>(&self, f: F)
    where
        L::Storage: BucketAccess<T0, I0> + BucketAccess<T1, I1> + BucketAccess<T2, I2>,
        T0: Component,
        T1: Component,
        T2: Component,
        F: Fn(&mut T0, &mut T1, &mut T2) + Sync,
    {
        let req = (1u64 << Self::index_of::<T0, I0>())
            | (1u64 << Self::index_of::<T1, I1>())
            | (1u64 << Self::index_of::<T2, I2>());
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            let bucket1 = unsafe { mgr.store.bucket_mut_unchecked::<T1, I1>() };
            let bucket2 = unsafe { mgr.store.bucket_mut_unchecked::<T2, I2>() };
            let w0 = bucket0.iter_mut().find(|w| w.owner() == id);
            let w1 = bucket1.iter_mut().find(|w| w.owner() == id);
            let w2 = bucket2.iter_mut().find(|w| w.owner() == id);
            if let (Some(w0), Some(w1), Some(w2)) = (w0, w1, w2) {
                f(w0.payload_mut(), w1.payload_mut(), w2.payload_mut());
            }
        });
    }

    pub fn apply_system_3_with_interface<T0, I0, T1, I1, T2, I2, F>(&self, f: F)
    where
        L::Storage: BucketAccess<T0, I0> + BucketAccess<T1, I1> + BucketAccess<T2, I2>,
        T0: Component,
        T1: Component,
        T2: Component,
        F: Fn(Interface<'_>, &mut T0, &mut T1, &mut T2) + Sync,
    {
        let req = (1u64 << Self::index_of::<T0, I0>())
            | (1u64 << Self::index_of::<T1, I1>())
            | (1u64 << Self::index_of::<T2, I2>());
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            let bucket1 = unsafe { mgr.store.bucket_mut_unchecked::<T1, I1>() };
            let bucket2 = unsafe { mgr.store.bucket_mut_unchecked::<T2, I2>() };
            let w0 = bucket0.iter_mut().find(|w| w.owner() == id);
            let w1 = bucket1.iter_mut().find(|w| w.owner() == id);
            let w2 = bucket2.iter_mut().find(|w| w.owner() == id);
            if let (Some(w0), Some(w1), Some(w2)) = (w0, w1, w2) {
                f(
                    mgr.interface_for(slot),
                    w0.payload_mut(),
                    w1.payload_mut(),
                    w2.payload_mut(),
                );
            }
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_system_4<T0, I0, T1, I1, T2, I2, T3, I3, F>(&self, f: F)
    where
        L::Storage:
            BucketAccess<T0, I0> + BucketAccess<T1, I1> + BucketAccess<T2, I2> + BucketAccess<T3, I3>,
        T0: Component,
        T1: Component,
        T2: Component,
        T3: Component,
        F: Fn(&mut T0, &mut T1, &mut T2, &mut T3) + Sync,
    {
        let req = (1u64 << Self::index_of::<T0, I0>())
            | (1u64 << Self::index_of::<T1, I1>())
            | (1u64 << Self::index_of::<T2, I2>())
            | (1u64 << Self::index_of::<T3, I3>());
        self.dispatch(req, move |mgr, slot| {
            let id = mgr.ids[slot];
            let bucket0 = unsafe { mgr.store.bucket_mut_unchecked::<T0, I0>() };
            let bucket1 = unsafe { mgr.store.bucket_mut_unchecked::<T1, I1>() };
            let bucket2 = unsafe { mgr.store.bucket_mut_unchecked::<T2, I2>() };
            let bucket3 = unsafe { mgr.store.bucket_mut_unchecked::<T3, I3>() };
            let w0 = bucket0.iter_mut().find(|w| w.owner() == id);
            let w1 = bucket1.iter_mut().find(|w| w.owner() == id);
            let w2 = bucket2.iter_mut().find(|w| w.owner() == id);
            let w3 = bucket3.iter_mut().find(|w| w.owner() == id);
            if let (Some(w0), Some(w1), Some(w2), Some(w3)) = (w0, w1, w2, w3) {
                f(
                    w0.payload_mut(),
                    w1.payload_mut(),
                    w2.payload_mut(),
                    w3.payload_mut(),
                );
            }
        });
    }

    fn index_of<T, I>() -> usize
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        crate::store::ComponentStore::<L>::index_of::<T, I>()
    }
}
