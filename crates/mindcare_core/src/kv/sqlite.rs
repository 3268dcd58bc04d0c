//! SQLite-backed key/value store for local use.
//!
//! # Invariants
//! - Values live in `kv_entries`; availability lives in `store_meta`.
//! - `set` is an upsert and bumps `updated_at`.

use super::{KeyValueStore, KvError, KvResult};
use crate::db::{open_db, open_db_in_memory};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const LOCAL_ADDRESS_PREFIX: &str = "sqlite:";

/// Key/value store over one SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
    address: String,
}

impl SqliteKvStore {
    /// Opens (and migrates) a store file.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Ok(Self {
            conn,
            address: format!("{LOCAL_ADDRESS_PREFIX}{}", path.display()),
        })
    }

    pub fn open_in_memory() -> KvResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            address: format!("{LOCAL_ADDRESS_PREFIX}memory"),
        })
    }

    /// Overrides the address reported to reveal challenges.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Persists the availability flag read by `is_available`.
    pub fn set_available(&self, available: bool) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO store_meta (name, value) VALUES ('available', ?1)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value;",
            [if available { "1" } else { "0" }],
        )?;
        Ok(())
    }

    /// Lists stored keys in ascending order.
    pub fn keys(&self) -> KvResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn is_available(&self) -> KvResult<bool> {
        let flag: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM store_meta WHERE name = 'available';",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(flag.as_deref() != Some("0"))
    }

    fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        let value: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or_default())
    }

    fn set(&self, key: &str, value: &[u8]) -> KvResult<()> {
        if key.is_empty() {
            return Err(KvError::WriteRejected {
                key: String::new(),
                reason: "key must not be empty".to_string(),
            });
        }
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        debug!(
            "event=kv_set module=kv status=ok key_len={} value_len={}",
            key.len(),
            value.len()
        );
        Ok(())
    }

    fn address(&self) -> String {
        self.address.clone()
    }
}
