//! Convenience re-exports for `use ecs_core::prelude::*;`.

pub use crate::component::Component;
pub use crate::error::{Error, Result};
pub use crate::interface::Interface;
pub use crate::manager::Manager;
pub use crate::type_list;
