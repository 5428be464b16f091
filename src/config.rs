//! Runtime configuration read from `SEQCODE_*` environment variables.
//!
//! `main` loads a `.env` file first, so every key can also live there.

use std::path::PathBuf;
use std::str::FromStr;

use crate::code::{DEFAULT_WIDTH, MAX_WIDTH};

/// Default compare-and-swap retry budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Which [`crate::ports::SequenceStore`] backs the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// `<store>/sequences.db`, safe across processes.
    #[default]
    Sqlite,
    /// YAML documents under `<store>/sequences/`, single process.
    File,
    /// Nothing persisted.
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" | "yaml" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown SEQCODE_BACKEND {other:?} (expected sqlite, file or memory)")),
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory of all persisted state.
    pub store_root: PathBuf,
    /// Sequence store backend.
    pub backend: Backend,
    /// Zero-pad width of sequence suffixes.
    pub width: usize,
    /// Compare-and-swap retry budget per code.
    pub max_attempts: u32,
    /// Prefix of ticket numbers.
    pub ticket_prefix: String,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(".seqcode"),
            backend: Backend::default(),
            width: DEFAULT_WIDTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            ticket_prefix: "TKT".into(),
            log_filter: "warn".into(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the first invalid variable.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset keys.
    ///
    /// # Errors
    ///
    /// Returns an error string naming the first invalid variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();

        if let Some(root) = lookup("SEQCODE_STORE") {
            config.store_root = PathBuf::from(root);
        }
        if let Some(backend) = lookup("SEQCODE_BACKEND") {
            config.backend = backend.parse()?;
        }
        if let Some(width) = lookup("SEQCODE_WIDTH") {
            config.width = parse_positive("SEQCODE_WIDTH", &width)?;
            if config.width > MAX_WIDTH {
                return Err(format!("SEQCODE_WIDTH must be at most {MAX_WIDTH}, got {width:?}"));
            }
        }
        if let Some(attempts) = lookup("SEQCODE_MAX_ATTEMPTS") {
            config.max_attempts = parse_positive("SEQCODE_MAX_ATTEMPTS", &attempts)?;
        }
        if let Some(prefix) = lookup("SEQCODE_TICKET_PREFIX") {
            crate::code::validate_category(&prefix)
                .map_err(|e| format!("SEQCODE_TICKET_PREFIX: {e}"))?;
            config.ticket_prefix = prefix;
        }
        if let Some(filter) = lookup("SEQCODE_LOG") {
            config.log_filter = filter;
        }
        Ok(config)
    }

    /// Path of the `SQLite` database file.
    #[must_use]
    pub fn sqlite_path(&self) -> PathBuf {
        self.store_root.join("sequences.db")
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(format!("{key} must be a positive integer, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sqlite_path(), PathBuf::from(".seqcode/sequences.db"));
    }

    #[test]
    fn reads_every_key() {
        let config = Config::from_lookup(lookup(&[
            ("SEQCODE_STORE", "/var/lib/seqcode"),
            ("SEQCODE_BACKEND", "file"),
            ("SEQCODE_WIDTH", "5"),
            ("SEQCODE_MAX_ATTEMPTS", "3"),
            ("SEQCODE_TICKET_PREFIX", "MT"),
            ("SEQCODE_LOG", "seqcode=debug"),
        ]))
        .unwrap();

        assert_eq!(config.store_root, PathBuf::from("/var/lib/seqcode"));
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.width, 5);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.ticket_prefix, "MT");
        assert_eq!(config.log_filter, "seqcode=debug");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("SEQCODE_BACKEND", "postgres")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SEQCODE_WIDTH", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SEQCODE_WIDTH", "21")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SEQCODE_WIDTH", "20")])).is_ok());
        assert!(Config::from_lookup(lookup(&[("SEQCODE_MAX_ATTEMPTS", "many")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SEQCODE_TICKET_PREFIX", "T K")])).is_err());
    }
}
