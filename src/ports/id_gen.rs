//! ID generator port for asset and ticket record identifiers.

/// Generates unique record identifiers.
///
/// These are opaque storage ids, independent of the human-readable codes
/// issued by the sequence generator.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
