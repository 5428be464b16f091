//! Backends for the `SequenceStore` port.

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileSequenceStore;
pub use memory::MemorySequenceStore;
pub use sqlite::SqliteSequenceStore;
