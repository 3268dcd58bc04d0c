//! Key/value collaborator contract.
//!
//! # Responsibility
//! - Describe the contract-like byte store the record store persists into.
//! - Provide local implementations for tests and the CLI.
//!
//! # Invariants
//! - An empty value means "absent", never an error.
//! - `get` is unauthenticated; `set` may be refused by the backing system.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type KvResult<T> = Result<T, KvError>;

/// Byte-blob store addressed by string keys.
pub trait KeyValueStore {
    /// Whether the store currently accepts reads.
    fn is_available(&self) -> KvResult<bool>;
    /// Reads the value at `key`; an empty vec when nothing is stored.
    fn get(&self, key: &str) -> KvResult<Vec<u8>>;
    /// Replaces the value at `key`.
    fn set(&self, key: &str, value: &[u8]) -> KvResult<()>;
    /// Address identifying the store, embedded in reveal challenges.
    fn address(&self) -> String;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn is_available(&self) -> KvResult<bool> {
        (**self).is_available()
    }

    fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn address(&self) -> String {
        (**self).address()
    }
}

#[derive(Debug)]
pub enum KvError {
    /// Backing system cannot be reached.
    Unavailable(String),
    /// Write was refused by the store (quota, validation, injected failure).
    WriteRejected { key: String, reason: String },
    /// Signer declined to authorize the write.
    Unauthorized(String),
    /// Local SQLite backing failed.
    Sqlite(rusqlite::Error),
    /// Store file was migrated by a newer build than this one.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "key/value store unavailable: {reason}"),
            Self::WriteRejected { key, reason } => {
                write!(f, "write to `{key}` rejected: {reason}")
            }
            Self::Unauthorized(reason) => write!(f, "write not authorized: {reason}"),
            Self::Sqlite(err) => write!(f, "local store error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "journal store uses schema {found}; this build reads up to {supported}"
            ),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
