//! Error types for code issuance and its persistence boundary.

use thiserror::Error;

/// Failure modes of [`crate::generator::CodeGenerator`].
///
/// All three propagate to the immediate caller; none carries a partially
/// generated code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    /// The category or period cannot be used. No store access occurred.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The sequence store failed to read or write.
    #[error("sequence store failure: {0}")]
    Persistence(String),

    /// Concurrent writers kept winning the compare-and-swap.
    #[error("gave up allocating a code for {category}/{period} after {attempts} conflicting attempts")]
    ConflictExhausted {
        /// Category that was contended.
        category: String,
        /// Period key that was contended.
        period: String,
        /// Number of attempts made.
        attempts: u32,
    },
}

impl CodeError {
    /// Stable machine-readable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
            Self::ConflictExhausted { .. } => "conflict_exhausted",
        }
    }
}

/// Failure modes of a [`crate::ports::SequenceStore`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The stored counter no longer matches the expected value.
    #[error("sequence row changed concurrently")]
    Conflict,

    /// Any other backend failure (I/O, SQL, serialization).
    #[error("{0}")]
    Backend(String),
}

/// Failure modes of [`crate::registry::RecordStore`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No code could be issued for the new record.
    #[error(transparent)]
    Code(#[from] CodeError),

    /// The submitted record is incomplete.
    #[error("invalid record: {0}")]
    Invalid(String),

    /// Reading or writing a record failed.
    #[error("record storage failure: {0}")]
    Storage(String),

    /// The referenced record does not exist.
    #[error("no record with code {0}")]
    NotFound(String),
}
