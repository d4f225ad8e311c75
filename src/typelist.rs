//! Compile-time list of component types.
//!
//! A declared component list `L` is built out of [`Nil`] and [`Cons`], a
//! classic heterogeneous cons-list, because bucket lookup needs *named*
//! positions (find the bucket for `T`) rather than a left/right tuple
//! split.
//!
//! Two families of trait live here:
//!
//! * [`ComponentList`] / [`BucketStorage`] — walk the *whole* list at
//!   runtime (reserve every bucket, clear every bucket, locate a bucket by
//!   a dynamic `usize` index). These back the `*_by_index` operations.
//! * [`BucketAccess`] — locate the bucket for one concrete type `T` at
//!   compile time. `Here`/`There<I>` are the classic marker types that let
//!   the compiler pick a single impl without the coherence conflict a naive
//!   `impl<A, B> IndexOf<A> for (A, B)` / `impl<A, B> IndexOf<B> for (A, B)`
//!   pair would hit the moment `A == B` were substitutable.
//!
//! Passing a type that isn't in `L` to `find`/`add`/`remove`/etc. fails to
//! typecheck: no `BucketAccess<T, _>` impl exists for it, rejecting the
//! invalid call at compile time instead of at runtime.

use std::marker::PhantomData;

use crate::component::{Component, Wrapper};
use crate::store::sync_cell::SyncUnsafeCell;

/// The empty component list.
pub struct Nil;

/// A component list with `H` at the head and `T` as the rest.
pub struct Cons<H, T>(PhantomData<(H, T)>);

/// Marks "the head of this cons cell is the type we're looking for".
pub struct Here;

/// Marks "recurse into the tail to find the type".
pub struct There<I>(PhantomData<I>);

/// A declared, ordered list of component types, `N <= 64` of them.
///
/// Implemented for [`Nil`] and for [`Cons<H, T>`] where `T: ComponentList`.
/// Build one with the [`type_list!`](crate::type_list) macro rather than by
/// hand.
pub trait ComponentList: 'static {
    /// Number of types in the list.
    const SIZE: usize;
    /// The per-type bucket storage shaped like this list.
    type Storage: BucketStorage;
}

impl ComponentList for Nil {
    const SIZE: usize = 0;
    type Storage = NilBuckets;
}

impl<H: Component, T: ComponentList> ComponentList for Cons<H, T> {
    const SIZE: usize = 1 + T::SIZE;
    type Storage = ConsBuckets<H, T::Storage>;
}

/// Runtime, index-keyed operations over every bucket in a component store.
///
/// These back the `*_by_index` family: callers that only have a dynamic
/// `usize` (e.g. a bit position popped off a runtime `u64` mask) still get
/// a correct, total operation, just without the static type guarantee
/// `BucketAccess` provides.
pub trait BucketStorage: Default + Send + Sync + 'static {
    /// Reserve capacity in every bucket — pre-reserved to the manager's
    /// capacity bound so no bucket reallocates mid-dispatch.
    fn reserve_all(&mut self, additional: usize);
    /// Truncate every bucket.
    fn clear(&mut self);
    /// Sum of every bucket's length.
    fn len(&self) -> usize;
    /// Append a default-constructed wrapper to bucket `index`, owned by
    /// `owner`. Returns `false` if `index` is out of range.
    fn add_by_index(&mut self, index: usize, owner: u64) -> bool;
    /// Swap-remove, from every bucket, the wrapper (if any) owned by
    /// `owner`. Silent on absence in each bucket: at most one wrapper per
    /// `(type, owner)` pair can ever exist, so there is nothing left to
    /// remove once the first match is gone.
    fn remove_all_owned_by(&mut self, owner: u64);
    /// Whether bucket `index` holds a wrapper owned by `owner`.
    fn exists_by_index(&self, index: usize, owner: u64) -> bool;
    /// Length of bucket `index`, or `None` if `index` is out of range.
    fn bucket_len_by_index(&self, index: usize) -> Option<usize>;
}

/// Bucket storage for [`Nil`]: no buckets, every dynamic op is a no-op or
/// an out-of-range miss.
#[derive(Default)]
pub struct NilBuckets;

impl BucketStorage for NilBuckets {
    fn reserve_all(&mut self, _additional: usize) {}
    fn clear(&mut self) {}
    fn len(&self) -> usize {
        0
    }
    fn add_by_index(&mut self, _index: usize, _owner: u64) -> bool {
        false
    }
    fn remove_all_owned_by(&mut self, _owner: u64) {}
    fn exists_by_index(&self, _index: usize, _owner: u64) -> bool {
        false
    }
    fn bucket_len_by_index(&self, _index: usize) -> Option<usize> {
        None
    }
}

/// Bucket storage for [`Cons<H, Rest>`]: one growable sequence of
/// `Wrapper<H>` plus whatever `Rest` needs.
///
/// The bucket lives behind a [`SyncUnsafeCell`] rather than a plain `Vec`
/// so that a dispatch can hand out `&mut Vec<Wrapper<T>>` for several
/// distinct `T`s from a single shared `&ComponentStore`, one per worker
/// thread. See `store::sync_cell` for the safety argument.
pub struct ConsBuckets<H: Component, Rest: BucketStorage> {
    pub(crate) bucket: SyncUnsafeCell<Vec<Wrapper<H>>>,
    pub(crate) rest: Rest,
}

impl<H: Component, Rest: BucketStorage> Default for ConsBuckets<H, Rest> {
    fn default() -> Self {
        ConsBuckets {
            bucket: SyncUnsafeCell::new(Vec::new()),
            rest: Rest::default(),
        }
    }
}

impl<H: Component, Rest: BucketStorage> BucketStorage for ConsBuckets<H, Rest> {
    fn reserve_all(&mut self, additional: usize) {
        self.bucket.get_mut().reserve(additional);
        self.rest.reserve_all(additional);
    }

    fn clear(&mut self) {
        self.bucket.get_mut().clear();
        self.rest.clear();
    }

    fn len(&self) -> usize {
        self.bucket.as_ref().len() + self.rest.len()
    }

    fn add_by_index(&mut self, index: usize, owner: u64) -> bool {
        if index == 0 {
            self.bucket.get_mut().push(Wrapper::new(H::default(), owner));
            true
        } else {
            self.rest.add_by_index(index - 1, owner)
        }
    }

    fn remove_all_owned_by(&mut self, owner: u64) {
        let bucket = self.bucket.get_mut();
        if let Some(pos) = bucket.iter().position(|w| w.owner() == owner) {
            bucket.swap_remove(pos);
        }
        self.rest.remove_all_owned_by(owner);
    }

    fn exists_by_index(&self, index: usize, owner: u64) -> bool {
        if index == 0 {
            self.bucket.as_ref().iter().any(|w| w.owner() == owner)
        } else {
            self.rest.exists_by_index(index - 1, owner)
        }
    }

    fn bucket_len_by_index(&self, index: usize) -> Option<usize> {
        if index == 0 {
            Some(self.bucket.as_ref().len())
        } else {
            self.rest.bucket_len_by_index(index - 1)
        }
    }
}

/// Compile-time lookup of the bucket for type `T` within a [`BucketStorage`].
///
/// `I` is inferred by the compiler — callers write `BucketAccess<T, _>` and
/// never name `Here`/`There<..>` directly.
pub trait BucketAccess<T: Component, I>: BucketStorage {
    /// Position of `T` in the declared list.
    const INDEX: usize;
    /// Shared access to the cell backing `T`'s bucket.
    fn cell(&self) -> &SyncUnsafeCell<Vec<Wrapper<T>>>;
}

impl<T: Component, Rest: BucketStorage> BucketAccess<T, Here> for ConsBuckets<T, Rest> {
    const INDEX: usize = 0;

    fn cell(&self) -> &SyncUnsafeCell<Vec<Wrapper<T>>> {
        &self.bucket
    }
}

impl<H, Rest, T, I> BucketAccess<T, There<I>> for ConsBuckets<H, Rest>
where
    H: Component,
    Rest: BucketAccess<T, I>,
    T: Component,
{
    const INDEX: usize = 1 + <Rest as BucketAccess<T, I>>::INDEX;

    fn cell(&self) -> &SyncUnsafeCell<Vec<Wrapper<T>>> {
        self.rest.cell()
    }
}

/// Builds a [`Cons`] chain from a flat list of types, e.g.
/// `type_list![Position, Velocity, Health]` expands to
/// `Cons<Position, Cons<Velocity, Cons<Health, Nil>>>`.
#[macro_export]
macro_rules! type_list {
    () => { $crate::typelist::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::typelist::Cons<$head, $crate::type_list!($($tail),*)>
    };
}
