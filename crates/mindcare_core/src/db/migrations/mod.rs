//! Schema steps for the key/value store.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - The schema version is `PRAGMA user_version`; steps run in one transaction.

use crate::kv::{KvError, KvResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` pairs in apply order.
const STEPS: [(u32, &str); 2] = [
    (1, include_str!("0001_kv_entries.sql")),
    (2, include_str!("0002_store_meta.sql")),
];

/// Highest schema version this build can open.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> KvResult<()> {
    let from: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from > latest {
        return Err(KvError::SchemaTooNew {
            found: from,
            supported: latest,
        });
    }

    let pending: Vec<&(u32, &str)> = STEPS.iter().filter(|(version, _)| *version > from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", *version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        from,
        latest,
        pending.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{latest_version, STEPS};

    #[test]
    fn step_versions_are_contiguous() {
        for (index, (version, _)) in STEPS.iter().enumerate() {
            assert_eq!(*version as usize, index + 1);
        }
        assert_eq!(latest_version(), STEPS.len() as u32);
    }
}
