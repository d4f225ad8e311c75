#![warn(missing_docs)]

//! # ecs-core
//!
//! A generic entity-component-system core: type-indexed component storage,
//! an entity manager with bitset-driven filtering, and a system dispatcher
//! backed by a cancellable worker thread pool.
//!
//! A component list is declared once with [`type_list!`] and used to
//! parameterize a [`Manager`]:
//!
//! ```
//! use ecs_core::{type_list, Manager};
//!
//! type Components = type_list![i32, f32];
//!
//! let mut mgr = Manager::<Components>::with_capacity_and_workers(10, 1);
//! let id = mgr.add_entity(0b01, 0).unwrap();
//! mgr.apply_system_1::<i32, _, _>(|x| *x = 7);
//! assert_eq!(*mgr.get_component::<i32, _>(id).unwrap(), 7);
//! ```

pub mod component;
pub mod dispatch;
pub mod error;
pub mod interface;
pub mod manager;
pub mod pool;
pub mod prelude;
pub mod store;
pub mod typelist;

pub use component::{Component, Wrapper};
pub use dispatch::PARALLEL_THRESHOLD;
pub use error::{Error, Result};
pub use interface::Interface;
pub use manager::{Manager, DEFAULT_CAPACITY};
pub use pool::{TaskHandle, ThreadPool};
pub use store::ComponentStore;
pub use typelist::{ComponentList, Cons, Nil};
