//! Component store: an N-tuple of growable, type-segregated sequences.
//!
//! Lookup is linear in bucket size; removal is swap-remove and does not
//! preserve order. Buckets are pre-reserved to the manager's capacity
//! bound at construction — growth past that bound is a logic error in this
//! crate's own code, never a reallocation racing a live dispatch.

pub(crate) mod sync_cell;

use crate::component::{Component, Wrapper};
use crate::error::{Error, Result};
use crate::typelist::{BucketAccess, BucketStorage, ComponentList};

/// Heterogeneous, type-indexed component storage for the list `L`.
pub struct ComponentStore<L: ComponentList> {
    buckets: L::Storage,
}

impl<L: ComponentList> ComponentStore<L> {
    /// Creates an empty store with every bucket reserved for `capacity`
    /// entities.
    pub fn new(capacity: usize) -> Self {
        let mut buckets = L::Storage::default();
        buckets.reserve_all(capacity);
        ComponentStore { buckets }
    }

    /// Read-only lookup of `T` owned by `id`.
    pub fn find<T, I>(&self, id: u64) -> Result<&T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.try_find(id).ok_or(Error::NotFound {
            entity: id,
            type_name: std::any::type_name::<T>(),
        })
    }

    /// Mutable lookup of `T` owned by `id`.
    pub fn find_mut<T, I>(&mut self, id: u64) -> Result<&mut T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let type_name = std::any::type_name::<T>();
        self.try_find_mut(id).ok_or(Error::NotFound {
            entity: id,
            type_name,
        })
    }

    /// Read-only lookup that recovers absence instead of erroring.
    pub fn try_find<T, I>(&self, id: u64) -> Option<&T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let bucket = self.buckets.cell().as_ref();
        bucket.iter().find(|w| w.owner() == id).map(Wrapper::payload)
    }

    /// Mutable lookup that recovers absence instead of erroring.
    pub fn try_find_mut<T, I>(&mut self, id: u64) -> Option<&mut T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let bucket = self.bucket_mut::<T, I>();
        bucket
            .iter_mut()
            .find(|w| w.owner() == id)
            .map(Wrapper::payload_mut)
    }

    /// Returns the existing wrapper's payload, or appends a fresh default
    /// one and returns that.
    pub fn find_or_create<T, I>(&mut self, id: u64) -> &mut T
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let bucket = self.bucket_mut::<T, I>();
        let pos = bucket.iter().position(|w| w.owner() == id);
        let idx = match pos {
            Some(i) => i,
            None => {
                bucket.push(Wrapper::new(T::default(), id));
                bucket.len() - 1
            }
        };
        bucket[idx].payload_mut()
    }

    /// Unconditionally appends a default wrapper owned by `id`.
    ///
    /// A bucket must hold at most one wrapper per `(type, id)` pair; debug
    /// builds assert against a duplicate insert immediately, release builds
    /// leave the duplicate in place (downstream lookups then see whichever
    /// wrapper a linear scan finds first, which is undefined in practice).
    pub fn add<T, I>(&mut self, id: u64) -> &mut T
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let bucket = self.bucket_mut::<T, I>();
        debug_assert!(
            !bucket.iter().any(|w| w.owner() == id),
            "duplicate component insert for entity {id}",
        );
        bucket.push(Wrapper::new(T::default(), id));
        let last = bucket.len() - 1;
        bucket[last].payload_mut()
    }

    /// Swap-removes the wrapper owned by `id` from `T`'s bucket.
    pub fn remove<T, I>(&mut self, id: u64) -> Result<()>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let bucket = self.bucket_mut::<T, I>();
        match bucket.iter().position(|w| w.owner() == id) {
            Some(pos) => {
                bucket.swap_remove(pos);
                Ok(())
            }
            None => Err(Error::NotFound {
                entity: id,
                type_name: std::any::type_name::<T>(),
            }),
        }
    }

    /// Sweeps every bucket, swap-removing the wrapper (if any) owned by
    /// `id`. Silent on absence in each bucket.
    pub fn remove_all_owned_by(&mut self, id: u64) {
        self.buckets.remove_all_owned_by(id);
    }

    /// Appends a default-constructed component to the bucket at the given
    /// declared-list position. Used by the mask-driven bulk creator.
    /// Returns `false` if `index` is out of range.
    pub fn add_by_index(&mut self, index: usize, id: u64) -> bool {
        self.buckets.add_by_index(index, id)
    }

    /// Whether bucket `index` holds a wrapper owned by `id`.
    pub fn exists_by_index(&self, index: usize, id: u64) -> bool {
        self.buckets.exists_by_index(index, id)
    }

    /// Truncates every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Sum of every bucket's length.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of `T`'s bucket.
    pub fn bucket_len<T, I>(&self) -> usize
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.buckets.cell().as_ref().len()
    }

    /// `T`'s whole bucket, in insertion order, for callers that want to walk
    /// every wrapper of one type directly rather than going entity-by-id.
    pub fn bucket<T, I>(&self) -> &[Wrapper<T>]
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.buckets.cell().as_ref().as_slice()
    }

    /// Length of the bucket at a dynamic declared-list position.
    pub fn bucket_len_by_index(&self, index: usize) -> Option<usize> {
        self.buckets.bucket_len_by_index(index)
    }

    /// Position of `T` in the declared list.
    pub fn index_of<T, I>() -> usize
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        <L::Storage as BucketAccess<T, I>>::INDEX
    }

    /// Assembles `(&mut T0, &mut T1)` for one entity. Fails `NotFound` if
    /// either component is missing — unlike `apply_system_*`, which skips
    /// non-matching entities instead of erroring, this is the direct, total
    /// assembly for callers that already know the entity's mask covers both
    /// types.
    pub fn tuple2_mut<T0, I0, T1, I1>(&mut self, id: u64) -> Result<(&mut T0, &mut T1)>
    where
        L::Storage: BucketAccess<T0, I0> + BucketAccess<T1, I1>,
        T0: Component,
        T1: Component,
    {
        // SAFETY: `T0` and `T1` are distinct types (two different
        // `BucketAccess` impls can't both name the same bucket for one
        // list), so the two `&mut` borrows below never alias.
        let b0 = unsafe { self.bucket_mut_unchecked::<T0, I0>() };
        let b1 = unsafe { self.bucket_mut_unchecked::<T1, I1>() };
        let w0 = b0
            .iter_mut()
            .find(|w| w.owner() == id)
            .ok_or(Error::NotFound {
                entity: id,
                type_name: std::any::type_name::<T0>(),
            })?;
        let w1 = b1
            .iter_mut()
            .find(|w| w.owner() == id)
            .ok_or(Error::NotFound {
                entity: id,
                type_name: std::any::type_name::<T1>(),
            })?;
        Ok((w0.payload_mut(), w1.payload_mut()))
    }

    /// Assembles `(&mut T0, &mut T1, &mut T2)` for one entity. See
    /// [`tuple2_mut`](Self::tuple2_mut).
    pub fn tuple3_mut<T0, I0, T1, I1, T2, I2>(
        &mut self,
        id: u64,
    ) -> Result<(&mut T0, &mut T1, &mut T2)>
    where
        L::Storage: BucketAccess<T0, I0> + BucketAccess<T1, I1> + BucketAccess<T2, I2>,
        T0: Component,
        T1: Component,
        T2: Component,
    {
        let b0 = unsafe { self.bucket_mut_unchecked::<T0, I0>() };
        let b1 = unsafe { self.bucket_mut_unchecked::<T1, I1>() };
        let b2 = unsafe { self.bucket_mut_unchecked::<T2, I2>() };
        let w0 = b0
            .iter_mut()
            .find(|w| w.owner() == id)
            .ok_or(Error::NotFound {
                entity: id,
                type_name: std::any::type_name::<T0>(),
            })?;
        let w1 = b1
            .iter_mut()
            .find(|w| w.owner() == id)
            .ok_or(Error::NotFound {
                entity: id,
                type_name: std::any::type_name::<T1>(),
            })?;
        let w2 = b2
            .iter_mut()
            .find(|w| w.owner() == id)
            .ok_or(Error::NotFound {
                entity: id,
                type_name: std::any::type_name::<T2>(),
            })?;
        Ok((w0.payload_mut(), w1.payload_mut(), w2.payload_mut()))
    }

    /// Raw access to the underlying buckets, for the dispatcher's unsafe,
    /// partition-disjoint tuple assembly.
    pub(crate) fn buckets(&self) -> &L::Storage {
        &self.buckets
    }

    pub(crate) fn buckets_mut(&mut self) -> &mut L::Storage {
        &mut self.buckets
    }

    /// `&mut Vec<Wrapper<T>>` reached from `&mut self`.
    ///
    /// SAFETY: the method takes `&mut self`, so the borrow checker already
    /// guarantees exclusive access to the whole store; reading through the
    /// cell here never aliases a live reference.
    fn bucket_mut<T, I>(&mut self) -> &mut Vec<Wrapper<T>>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        unsafe { self.buckets.cell().as_mut_unchecked() }
    }

    /// `&mut Vec<Wrapper<T>>` reached from a *shared* `&self`, for the
    /// dispatcher's worker threads.
    ///
    /// # Safety
    ///
    /// Callers must guarantee no two live calls (on this thread or another)
    /// ever alias the same `(T, id)` pair concurrently. The dispatcher
    /// upholds this by partitioning entity slots into disjoint contiguous
    /// ranges before handing workers their tuples.
    pub(crate) unsafe fn bucket_mut_unchecked<T, I>(&self) -> &mut Vec<Wrapper<T>>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        unsafe { self.buckets.cell().as_mut_unchecked() }
    }
}
