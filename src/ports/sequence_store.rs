//! Sequence store port: the persistent `(category, period) -> last sequence` map.

use serde::{Deserialize, Serialize};

use crate::code::PeriodKey;
use crate::error::StoreError;

/// Identifies one independent counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceKey {
    /// Category partitioning the counters (asset type, `ticket`, ...).
    pub category: String,
    /// Period the counter belongs to.
    pub period: PeriodKey,
}

impl SequenceKey {
    /// Builds a key from its parts.
    #[must_use]
    pub fn new(category: impl Into<String>, period: PeriodKey) -> Self {
        Self { category: category.into(), period }
    }
}

/// The stored state of one counter.
///
/// `formatted_code` is always the rendering of `last_sequence` and is kept
/// for lookup; it can be re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    /// Counter category.
    pub category: String,
    /// Counter period.
    pub period: PeriodKey,
    /// Highest sequence issued so far.
    pub last_sequence: u64,
    /// Code rendered from `last_sequence`.
    pub formatted_code: String,
}

impl SequenceRecord {
    /// Key of the counter this record belongs to.
    #[must_use]
    pub fn key(&self) -> SequenceKey {
        SequenceKey::new(self.category.clone(), self.period.clone())
    }
}

/// Persists sequence counters.
///
/// Implementations must make [`SequenceStore::compare_and_swap`] atomic with
/// respect to every other call for the same key. That single primitive is
/// what keeps concurrently issued codes unique.
pub trait SequenceStore: Send + Sync {
    /// Reads the counter for `key`, or `None` if no code was issued for it yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the read fails.
    fn get(&self, key: &SequenceKey) -> Result<Option<SequenceRecord>, StoreError>;

    /// Stores `record` only if the current `last_sequence` for its key equals
    /// `expected` (`None` meaning no row exists).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored value differs from
    /// `expected`, or [`StoreError::Backend`] on any other failure.
    fn compare_and_swap(
        &self,
        expected: Option<u64>,
        record: &SequenceRecord,
    ) -> Result<(), StoreError>;

    /// Lists counters, optionally restricted to one category, ordered by
    /// category then period.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the rows cannot be read.
    fn list(&self, category: Option<&str>) -> Result<Vec<SequenceRecord>, StoreError>;
}
