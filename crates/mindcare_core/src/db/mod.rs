//! SQLite bootstrap behind `SqliteKvStore`.
//!
//! Opening a connection always runs pending schema steps first, so callers
//! never see a half-migrated journal file. Errors surface as `KvError`.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
