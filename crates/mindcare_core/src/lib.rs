//! Core logic for the MindCare journal.
//!
//! Stores mood/stress entries through a contract-like key/value store, keeps
//! the private levels encoded, and reveals them only after a wallet signs a
//! session challenge.

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::{score, CodecError, FieldCodec, TaggedBase64Codec};
pub use config::{ConfigError, JournalConfig};
pub use error::{Failure, FailureKind};
pub use identity::{DevWallet, SignPolicy, Wallet, WalletError};
pub use kv::{KeyValueStore, KvError, MemoryKvStore, SqliteKvStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{suggested_categories, EntryDraft, Record, RecordBody, RecordId};
pub use repo::record_store::{NewRecord, RecordStore, StoreError, StoreResult};
pub use service::journal_service::{JournalService, LoadState, TransactionStatus, TrendPoint};
pub use service::reveal_gate::{
    ChallengeParams, RevealError, RevealGate, RevealOutcome, RevealState, RevealedValues,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
