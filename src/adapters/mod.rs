//! Adapters implementing the port traits.

pub mod fixed;
pub mod live;
pub mod memory_fs;
pub mod store;
