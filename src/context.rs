//! Service context bundling all port trait objects.

use crate::adapters::fixed::SequentialIdGenerator;
use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::memory_fs::MemoryFileSystem;
use crate::adapters::store::{FileSequenceStore, MemorySequenceStore, SqliteSequenceStore};
use crate::config::{Backend, Config};
use crate::ports::{Clock, FileSystem, IdGenerator, SequenceStore};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire
/// up different adapter implementations (live or in-memory).
pub struct ServiceContext {
    /// Clock used to derive period keys and record timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for asset and ticket records.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for record identifiers.
    pub id_gen: Box<dyn IdGenerator>,
    /// Persistent sequence counters.
    pub sequences: Box<dyn SequenceStore>,
}

impl ServiceContext {
    /// Creates a live context for the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SQLite` database cannot be opened.
    pub fn live(config: &Config) -> Result<Self, String> {
        let sequences: Box<dyn SequenceStore> = match config.backend {
            Backend::Sqlite => {
                let path = config.sqlite_path();
                let store = SqliteSequenceStore::open(&path).map_err(|e| e.to_string())?;
                tracing::debug!(path = %path.display(), "opened sqlite sequence store");
                Box::new(store)
            }
            Backend::File => {
                Box::new(FileSequenceStore::new(Box::new(LiveFileSystem), &config.store_root))
            }
            Backend::Memory => Box::new(MemorySequenceStore::new()),
        };
        let fs: Box<dyn FileSystem> = match config.backend {
            Backend::Memory => Box::new(MemoryFileSystem::new()),
            Backend::Sqlite | Backend::File => Box::new(LiveFileSystem),
        };

        Ok(Self {
            clock: Box::new(LiveClock),
            fs,
            id_gen: Box::new(LiveIdGenerator::new()),
            sequences,
        })
    }

    /// Creates a context that keeps everything in memory, with the given
    /// clock and predictable record ids.
    #[must_use]
    pub fn in_memory(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            fs: Box::new(MemoryFileSystem::new()),
            id_gen: Box::new(SequentialIdGenerator::new("rec")),
            sequences: Box::new(MemorySequenceStore::new()),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the sequence store.
    #[must_use]
    pub fn with_sequences(mut self, sequences: Box<dyn SequenceStore>) -> Self {
        self.sequences = sequences;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixed::FixedClock;
    use chrono::{TimeZone, Utc};

    #[test]
    fn memory_backend_context_is_empty() {
        let config = Config { backend: Backend::Memory, ..Config::default() };
        let ctx = ServiceContext::live(&config).unwrap();
        assert!(ctx.sequences.list(None).unwrap().is_empty());
    }

    #[test]
    fn sqlite_backend_creates_database_under_store_root() {
        let dir = std::env::temp_dir().join("seqcode_ctx_sqlite");
        let _ = std::fs::remove_dir_all(&dir);
        let config = Config { store_root: dir.clone(), ..Config::default() };

        let ctx = ServiceContext::live(&config).unwrap();
        assert!(ctx.sequences.list(None).unwrap().is_empty());
        assert!(dir.join("sequences.db").exists());

        drop(ctx);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn with_clock_overrides_time() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
        let config = Config { backend: Backend::Memory, ..Config::default() };
        let ctx = ServiceContext::live(&config).unwrap().with_clock(Box::new(FixedClock::new(at)));
        assert_eq!(ctx.clock.now(), at);
    }
}
