//! Entity/manager layer: parallel `ids`/`flags`/`mask` arrays wrapping a
//! [`ComponentStore`], plus the worker pool that backs `apply_system_*`
//! (see `crate::dispatch`).

#[cfg(test)]
mod tests;

use crate::component::Component;
use crate::error::{Error, Result};
use crate::pool::ThreadPool;
use crate::store::sync_cell::SyncUnsafeCell;
use crate::store::ComponentStore;
use crate::typelist::{BucketAccess, ComponentList};

/// Default capacity when none is given.
pub const DEFAULT_CAPACITY: usize = 1000;

/// An entity store parameterized by the declared component list `L`.
///
/// `flags` lives behind a [`SyncUnsafeCell`] for the same reason component
/// buckets do: a dispatch hands out a mutable flag reference per slot to
/// whichever worker owns that slot's contiguous range, from a single shared
/// `&Manager` (see `crate::dispatch`). `ids` and `mask` are read-only for
/// the duration of any dispatch — mutating operations and dispatches are
/// not allowed to run concurrently with each other — so they stay plain
/// `Vec`s.
pub struct Manager<L: ComponentList> {
    pub(crate) ids: Vec<u64>,
    pub(crate) flags: SyncUnsafeCell<Vec<u64>>,
    pub(crate) mask: Vec<u64>,
    pub(crate) store: ComponentStore<L>,
    capacity: usize,
    next_id: u64,
    pub(crate) pool: ThreadPool,
    pub(crate) parallel_threshold: usize,
}

impl<L: ComponentList> Manager<L> {
    /// Builds a manager with [`DEFAULT_CAPACITY`] and a worker pool sized to
    /// the available parallelism (falling back to 4 workers if that can't
    /// be determined).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::with_capacity_and_workers(capacity, workers)
    }

    pub fn with_capacity_and_workers(capacity: usize, workers: usize) -> Self {
        debug_assert!(L::SIZE <= 64, "component list exceeds the 64-bit mask width");
        Manager {
            ids: Vec::with_capacity(capacity),
            flags: SyncUnsafeCell::new(Vec::with_capacity(capacity)),
            mask: Vec::with_capacity(capacity),
            store: ComponentStore::new(capacity),
            capacity,
            next_id: 0,
            pool: ThreadPool::new(workers),
            parallel_threshold: crate::dispatch::PARALLEL_THRESHOLD,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    fn slot_of(&self, id: u64) -> Option<usize> {
        self.ids.iter().position(|&x| x == id)
    }

    /// Creates a new entity: for each bit `i < min(L::SIZE, 64)` set in
    /// `mask`, appends a default `Tᵢ`; appends id/flags/mask; returns the
    /// new id. A no-op returning `None` if `capacity` is already reached.
    pub fn add_entity(&mut self, mask: u64, flags: u64) -> Option<u64> {
        if self.ids.len() >= self.capacity {
            log::warn!(
                "add_entity rejected: capacity {} reached",
                self.capacity
            );
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        for i in 0..L::SIZE.min(64) {
            if mask & (1u64 << i) != 0 {
                self.store.add_by_index(i, id);
            }
        }
        self.ids.push(id);
        self.flags.get_mut().push(flags);
        self.mask.push(mask);
        Some(id)
    }

    /// Removes the entity's components, then swap-removes its slot from the
    /// three parallel arrays. No-op if `id` is not present.
    pub fn delete_entity(&mut self, id: u64) -> bool {
        let Some(slot) = self.slot_of(id) else {
            return false;
        };
        self.store.remove_all_owned_by(id);
        self.ids.swap_remove(slot);
        self.flags.get_mut().swap_remove(slot);
        self.mask.swap_remove(slot);
        true
    }

    pub fn delete_all_entities(&mut self) {
        log::debug!("delete_all_entities: clearing {} entities", self.ids.len());
        self.ids.clear();
        self.flags.get_mut().clear();
        self.mask.clear();
        self.store.clear();
    }

    /// Deletes every entity whose flag bits, read msb-first over the bits
    /// set in `mask`, equal `values` positionally. Fails if `values.len()`
    /// doesn't match `mask`'s popcount. Returns the number deleted.
    pub fn delete_filtered_entities(&mut self, mask: u64, values: &[bool]) -> Result<usize> {
        let want = mask.count_ones() as usize;
        if want != values.len() {
            return Err(Error::OutOfRange {
                index: values.len(),
                bound: want,
            });
        }
        let bits: Vec<u32> = (0..64u32).rev().filter(|b| mask & (1u64 << b) != 0).collect();
        let flags = self.flags.get_mut();
        let mut doomed = Vec::new();
        for slot in 0..self.ids.len() {
            let f = flags[slot];
            let matches = bits
                .iter()
                .zip(values.iter())
                .all(|(&bit, &want)| ((f & (1u64 << bit)) != 0) == want);
            if matches {
                doomed.push(self.ids[slot]);
            }
        }
        let count = doomed.len();
        for id in doomed {
            self.delete_entity(id);
        }
        Ok(count)
    }

    pub fn check_entity(&self, id: u64) -> bool {
        self.slot_of(id).is_some()
    }

    pub fn check_component<T, I>(&self, id: u64) -> bool
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.store.try_find::<T, I>(id).is_some()
    }

    pub fn check_component_by_index(&self, index: usize, id: u64) -> bool {
        self.store.exists_by_index(index, id)
    }

    /// Appends a default `T` owned by `id` and sets the matching mask bit.
    pub fn add_component<T, I>(&mut self, id: u64) -> Result<&mut T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        let slot = self.slot_of(id).ok_or(Error::NotFound {
            entity: id,
            type_name: std::any::type_name::<T>(),
        })?;
        let idx = ComponentStore::<L>::index_of::<T, I>();
        self.mask[slot] |= 1u64 << idx;
        Ok(self.store.add::<T, I>(id))
    }

    pub fn add_component_by_index(&mut self, index: usize, id: u64) -> Result<()> {
        let slot = self.slot_of(id).ok_or(Error::NotFound {
            entity: id,
            type_name: "<dynamic index>",
        })?;
        if index >= L::SIZE {
            return Err(Error::OutOfRange {
                index,
                bound: L::SIZE,
            });
        }
        if self.store.add_by_index(index, id) {
            self.mask[slot] |= 1u64 << index;
            Ok(())
        } else {
            Err(Error::InvalidType { index })
        }
    }

    pub fn get_component<T, I>(&self, id: u64) -> Result<&T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.store.find::<T, I>(id)
    }

    pub fn get_component_mut<T, I>(&mut self, id: u64) -> Result<&mut T>
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.store.find_mut::<T, I>(id)
    }

    pub fn bucket_len<T, I>(&self) -> usize
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.store.bucket_len::<T, I>()
    }

    pub fn bucket_len_by_index(&self, index: usize) -> Option<usize> {
        self.store.bucket_len_by_index(index)
    }

    /// `T`'s whole bucket, for callers that want to walk every wrapper of
    /// one type directly rather than going entity-by-id.
    pub fn bucket<T, I>(&self) -> &[crate::component::Wrapper<T>]
    where
        L::Storage: BucketAccess<T, I>,
        T: Component,
    {
        self.store.bucket::<T, I>()
    }

    pub fn get_flag(&self, bit: u32, id: u64) -> bool {
        match self.slot_of(id) {
            Some(slot) => (self.flags.as_ref()[slot] & (1u64 << bit)) != 0,
            None => false,
        }
    }

    pub fn set_flag(&mut self, bit: u32, id: u64, value: bool) {
        if let Some(slot) = self.slot_of(id) {
            let f = &mut self.flags.get_mut()[slot];
            if value {
                *f |= 1u64 << bit;
            } else {
                *f &= !(1u64 << bit);
            }
        }
    }

    pub fn set_flags_for_all(&mut self, bits: u64, value: bool) {
        for f in self.flags.get_mut().iter_mut() {
            if value {
                *f |= bits;
            } else {
                *f &= !bits;
            }
        }
    }

    /// Read-only view of every entity's flag word, in slot order.
    pub fn flags(&self) -> &[u64] {
        self.flags.as_ref().as_slice()
    }

    /// Mutable access to the whole flags vector, for bulk inspection or
    /// rewriting outside a dispatch.
    pub fn flags_mut(&mut self) -> &mut Vec<u64> {
        self.flags.get_mut()
    }

    /// Read-only view of every entity's component mask, in slot order.
    pub fn masks(&self) -> &[u64] {
        &self.mask
    }

    /// Read-only view of every entity's id, in slot order.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn resize_pool(&mut self, workers: usize) {
        self.pool.resize(workers);
    }

    pub fn halt_pool(&mut self) {
        self.pool.halt();
    }

    pub fn halt_pool_drain(&mut self) {
        self.pool.halt_drain();
    }

    pub fn restart_pool(&mut self) {
        log::debug!("restarting worker pool");
        self.pool.restart();
    }
}

impl<L: ComponentList> Default for Manager<L> {
    fn default() -> Self {
        Self::new()
    }
}
