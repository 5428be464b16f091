//! YAML-file sequence store.
//!
//! One document per category:
//!
//! ```text
//! <root>/
//!   └── sequences/
//!         ├── LAPTOP.yaml
//!         └── ticket.yaml
//! ```
//!
//! Compare-and-swap is serialized by an in-process mutex, so this backend
//! is only safe when a single process owns `<root>`. Use the `SQLite`
//! backend when several processes issue codes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::code::PeriodKey;
use crate::error::StoreError;
use crate::ports::{FileSystem, SequenceKey, SequenceRecord, SequenceStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CategoryFile {
    category: String,
    periods: BTreeMap<PeriodKey, PeriodEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PeriodEntry {
    last_sequence: u64,
    formatted_code: String,
}

/// Sequence store persisting YAML documents through a [`FileSystem`].
pub struct FileSequenceStore {
    fs: Box<dyn FileSystem>,
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSequenceStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(fs: Box<dyn FileSystem>, root: &Path) -> Self {
        Self { fs, root: root.to_path_buf(), write_lock: Mutex::new(()) }
    }

    fn dir(&self) -> PathBuf {
        self.root.join("sequences")
    }

    fn path(&self, category: &str) -> PathBuf {
        self.dir().join(format!("{category}.yaml"))
    }

    fn load(&self, category: &str) -> Result<CategoryFile, StoreError> {
        let path = self.path(category);
        if !self.fs.exists(&path) {
            return Ok(CategoryFile { category: category.to_string(), ..CategoryFile::default() });
        }
        let contents = self.fs.read_to_string(&path).map_err(|e| {
            StoreError::Backend(format!("Failed to read sequences for {category}: {e}"))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            StoreError::Backend(format!("Failed to parse sequences for {category}: {e}"))
        })
    }

    fn save(&self, file: &CategoryFile) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(file).map_err(|e| {
            StoreError::Backend(format!("Failed to serialize sequences for {}: {e}", file.category))
        })?;
        self.fs.write(&self.path(&file.category), &yaml).map_err(|e| {
            StoreError::Backend(format!("Failed to write sequences for {}: {e}", file.category))
        })
    }
}

fn to_record(category: &str, period: &PeriodKey, entry: &PeriodEntry) -> SequenceRecord {
    SequenceRecord {
        category: category.to_string(),
        period: period.clone(),
        last_sequence: entry.last_sequence,
        formatted_code: entry.formatted_code.clone(),
    }
}

impl SequenceStore for FileSequenceStore {
    fn get(&self, key: &SequenceKey) -> Result<Option<SequenceRecord>, StoreError> {
        let file = self.load(&key.category)?;
        Ok(file.periods.get(&key.period).map(|e| to_record(&key.category, &key.period, e)))
    }

    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        record: &SequenceRecord,
    ) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Backend("file store lock poisoned".into()))?;

        let mut file = self.load(&record.category)?;
        let current = file.periods.get(&record.period).map(|e| e.last_sequence);
        if current != expected {
            return Err(StoreError::Conflict);
        }
        file.periods.insert(
            record.period.clone(),
            PeriodEntry {
                last_sequence: record.last_sequence,
                formatted_code: record.formatted_code.clone(),
            },
        );
        self.save(&file)
    }

    fn list(&self, category: Option<&str>) -> Result<Vec<SequenceRecord>, StoreError> {
        let categories = match category {
            Some(c) => vec![c.to_string()],
            None => {
                if !self.fs.exists(&self.dir()) {
                    return Ok(Vec::new());
                }
                self.fs
                    .list_dir(&self.dir())
                    .map_err(|e| StoreError::Backend(format!("Failed to list sequences: {e}")))?
                    .into_iter()
                    .filter_map(|name| name.strip_suffix(".yaml").map(String::from))
                    .collect()
            }
        };

        let mut records = Vec::new();
        for c in categories {
            let file = self.load(&c)?;
            records.extend(file.periods.iter().map(|(p, e)| to_record(&c, p, e)));
        }
        Ok(records)
    }
}
