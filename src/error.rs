//! Error taxonomy.
//!
//! The design prefers compile-time rejection of bad type arguments (no
//! `BucketAccess<T, _>` impl exists, so it's a type error, not an
//! `Error::InvalidType`); `InvalidType` is reserved for the handful of
//! operations that only have a dynamic index to go on (the `*_by_index`
//! family). Total operations (`try_find`, `remove_all_owned_by`,
//! `delete_entity`, flag setters, `apply_system_*`) never return `Error` —
//! they recover absence internally instead of surfacing it.

use thiserror::Error as ThisError;

/// The crate's fallible return type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by fallible component-store and manager operations.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A dynamic index into the declared type list did not name a known
    /// type. Only reachable through the `*ByIndex` family, since typed
    /// calls are rejected at compile time instead.
    #[error("component index {index} is not a declared component type")]
    InvalidType {
        /// The out-of-bounds or otherwise unmapped index that was passed.
        index: usize,
    },

    /// Lookup by `(id, T)` found no matching wrapper.
    #[error("entity {entity} has no component of type `{type_name}`")]
    NotFound {
        /// The entity that was queried.
        entity: u64,
        /// `type_name::<T>()` of the component that was asked for.
        type_name: &'static str,
    },

    /// A dynamic index exceeded the declared list's size, or the manager's
    /// capacity bound was exceeded.
    #[error("index {index} is out of range (bound {bound})")]
    OutOfRange {
        /// The index or count that was requested.
        index: usize,
        /// The valid bound it was checked against.
        bound: usize,
    },

    /// A structural invariant was violated: a duplicate component insert
    /// for one entity, or a parallel-array length mismatch. Debug builds
    /// additionally `debug_assert!` before this variant is constructed, so
    /// release is the only build that can observe it as a recoverable
    /// `Error` rather than a panic.
    #[error("invariant violated: {detail}")]
    InvariantViolation {
        /// Human-readable description of which invariant broke.
        detail: &'static str,
    },
}
