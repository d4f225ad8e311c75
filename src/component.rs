//! The component wrapper: the unit actually stored in a bucket.

/// Marker trait for anything usable as component payload.
///
/// A fresh wrapper is default-constructed whenever `add_entity`'s mask bit
/// or `add_component` asks for one, so every component type must implement
/// `Default`. `Send + Sync` is required because components are read and
/// written from worker threads during `apply_system_*`.
pub trait Component: Default + Send + Sync + 'static {}

impl<T> Component for T where T: Default + Send + Sync + 'static {}

/// Binds one component payload to the id of the entity that owns it —
/// the record actually stored in a bucket.
pub struct Wrapper<T> {
    payload: T,
    owner: u64,
}

impl<T> Wrapper<T> {
    pub fn new(payload: T, owner: u64) -> Self {
        Wrapper { payload, owner }
    }

    pub fn owner(&self) -> u64 {
        self.owner
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }
}
