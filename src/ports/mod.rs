//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the numbering core and an
//! external system (time, record IDs, the filesystem, the sequence store).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod sequence_store;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use sequence_store::{SequenceKey, SequenceRecord, SequenceStore};
