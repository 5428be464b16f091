//! In-process sequence store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::ports::{SequenceKey, SequenceRecord, SequenceStore};

/// Sequence store kept in a mutex-guarded map. Lost on exit.
#[derive(Default)]
pub struct MemorySequenceStore {
    rows: Mutex<BTreeMap<SequenceKey, SequenceRecord>>,
}

impl MemorySequenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = SequenceRecord>) -> Self {
        let rows = records.into_iter().map(|r| (r.key(), r)).collect();
        Self { rows: Mutex::new(rows) }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<SequenceKey, SequenceRecord>>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

impl SequenceStore for MemorySequenceStore {
    fn get(&self, key: &SequenceKey) -> Result<Option<SequenceRecord>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        record: &SequenceRecord,
    ) -> Result<(), StoreError> {
        let mut rows = self.lock()?;
        let key = record.key();
        let current = rows.get(&key).map(|r| r.last_sequence);
        if current != expected {
            return Err(StoreError::Conflict);
        }
        rows.insert(key, record.clone());
        Ok(())
    }

    fn list(&self, category: Option<&str>) -> Result<Vec<SequenceRecord>, StoreError> {
        Ok(self
            .lock()?
            .values()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::PeriodKey;

    fn record(category: &str, period: &str, seq: u64) -> SequenceRecord {
        SequenceRecord {
            category: category.into(),
            period: PeriodKey::new(period).unwrap(),
            last_sequence: seq,
            formatted_code: format!("{category}-{period}-{seq:04}"),
        }
    }

    #[test]
    fn insert_then_update() {
        let store = MemorySequenceStore::new();
        store.compare_and_swap(None, &record("A", "2501", 1)).unwrap();
        store.compare_and_swap(Some(1), &record("A", "2501", 2)).unwrap();

        let key = SequenceKey::new("A", PeriodKey::new("2501").unwrap());
        assert_eq!(store.get(&key).unwrap().unwrap().last_sequence, 2);
    }

    #[test]
    fn stale_expectation_conflicts() {
        let store = MemorySequenceStore::new();
        store.compare_and_swap(None, &record("A", "2501", 1)).unwrap();

        assert_eq!(store.compare_and_swap(None, &record("A", "2501", 1)), Err(StoreError::Conflict));
        assert_eq!(
            store.compare_and_swap(Some(0), &record("A", "2501", 1)),
            Err(StoreError::Conflict)
        );
    }

    #[test]
    fn list_filters_and_orders() {
        let store = MemorySequenceStore::with_records([
            record("B", "2501", 3),
            record("A", "2502", 1),
            record("A", "2501", 9),
        ]);
        let all: Vec<_> = store.list(None).unwrap().into_iter().map(|r| r.formatted_code).collect();
        assert_eq!(all, vec!["A-2501-0009", "A-2502-0001", "B-2501-0003"]);
        assert_eq!(store.list(Some("B")).unwrap().len(), 1);
    }
}
