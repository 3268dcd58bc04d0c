//! Journal controller.
//!
//! # Responsibility
//! - Own the UI-facing state slices: load state, transaction status and
//!   per-record reveal state.
//! - Orchestrate submit/refresh/reveal over the record store and gate.
//!
//! # Invariants
//! - Every operation reports failures as `Failure`; nothing panics or is
//!   retried.
//! - A successful submit is followed by a full refresh.
//! - Trend points only carry values revealed for their own record.

use crate::codec::{FieldCodec, TaggedBase64Codec};
use crate::config::JournalConfig;
use crate::error::{Failure, FailureKind};
use crate::identity::{same_identity, Wallet, WalletError};
use crate::kv::KeyValueStore;
use crate::model::record::{EntryDraft, Record, RecordId};
use crate::repo::record_store::{NewRecord, RecordStore, StoreError};
use crate::service::reveal_gate::{ChallengeParams, RevealError, RevealGate, RevealOutcome, RevealState};
use log::{info, warn};
use std::sync::Arc;

/// Number of records plotted by `mood_trend`.
pub const TREND_WINDOW: usize = 7;
/// Number of annotations returned by `recent_feedback`.
pub const FEEDBACK_WINDOW: usize = 3;

const MSG_PENDING: &str = "Encrypting mental health data with Zama FHE...";
const MSG_SUCCESS: &str = "Your encrypted journal entry is saved securely!";
const MSG_REJECTED: &str = "Transaction rejected by user";
const MSG_CONNECT_FIRST: &str = "Please connect wallet first";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// Store reported itself unavailable; the list is empty.
    Unavailable,
}

/// Banner shown while and after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Hidden,
    Pending(String),
    Success(String),
    Error(String),
}

/// One bar of the mood chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub id: RecordId,
    pub timestamp: i64,
    /// Revealed mood of this record; `None` while hidden.
    pub mood: Option<f64>,
}

/// Single controller for one journal session.
pub struct JournalService<S, C = TaggedBase64Codec> {
    store: RecordStore<S, C>,
    gate: RevealGate<C>,
    wallet: Arc<dyn Wallet>,
    records: Vec<Record>,
    load_state: LoadState,
    status: TransactionStatus,
}

impl<S: KeyValueStore> JournalService<S, TaggedBase64Codec> {
    pub fn new(kv: S, wallet: Arc<dyn Wallet>, config: &JournalConfig) -> Result<Self, Failure> {
        Self::with_codec(kv, TaggedBase64Codec, wallet, config)
    }
}

impl<S: KeyValueStore, C: FieldCodec + Clone> JournalService<S, C> {
    /// Builds the session; fails only if challenge parameters cannot be read
    /// from the wallet.
    pub fn with_codec(
        kv: S,
        codec: C,
        wallet: Arc<dyn Wallet>,
        config: &JournalConfig,
    ) -> Result<Self, Failure> {
        let params = ChallengeParams::for_session(wallet.as_ref(), kv.address(), config)
            .map_err(reveal_failure)?;
        let gate = RevealGate::with_codec(
            Arc::clone(&wallet),
            codec.clone(),
            params,
            config.signature_timeout(),
        );
        let store = RecordStore::with_codec(kv, codec).configured(config);
        Ok(Self {
            store,
            gate,
            wallet,
            records: Vec::new(),
            load_state: LoadState::Idle,
            status: TransactionStatus::Hidden,
        })
    }

    pub fn store(&self) -> &RecordStore<S, C> {
        &self.store
    }

    pub fn gate(&self) -> &RevealGate<C> {
        &self.gate
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    pub fn dismiss_status(&mut self) {
        self.status = TransactionStatus::Hidden;
    }

    /// Connects the wallet and returns the active address.
    pub fn connect(&self) -> Result<String, Failure> {
        self.wallet.connect().map_err(wallet_failure)
    }

    /// Re-reads the full list from the store.
    pub fn refresh(&mut self) -> &[Record] {
        self.load_state = LoadState::Loading;
        let available = self.store.kv().is_available().unwrap_or(false);
        if available {
            self.records = self.store.list();
            self.load_state = LoadState::Ready;
        } else {
            self.records.clear();
            self.load_state = LoadState::Unavailable;
        }
        &self.records
    }

    /// Persists one entry for the connected wallet, then refreshes.
    pub fn submit(&mut self, draft: EntryDraft) -> Result<Record, Failure> {
        let Some(owner) = self.wallet.address() else {
            return Err(Failure::new(FailureKind::AuthRejected, MSG_CONNECT_FIRST));
        };
        draft
            .validate()
            .map_err(|err| Failure::new(FailureKind::InvalidInput, err.to_string()))?;

        self.status = TransactionStatus::Pending(MSG_PENDING.to_string());
        let created = self.store.create(NewRecord {
            category: draft.category,
            mood: f64::from(draft.mood),
            stress: f64::from(draft.stress),
            note: draft.note,
            owner,
        });

        match created {
            Ok(record) => {
                self.status = TransactionStatus::Success(MSG_SUCCESS.to_string());
                self.refresh();
                Ok(record)
            }
            Err(err) => {
                let failure = store_failure(&err);
                self.status = TransactionStatus::Error(submit_error_message(&failure));
                warn!(
                    "event=entry_submit module=service status=error error_code={}",
                    failure.kind.as_str()
                );
                Err(failure)
            }
        }
    }

    /// Toggles reveal for one listed record.
    pub async fn toggle_reveal(&mut self, id: &RecordId) -> Result<RevealOutcome, Failure> {
        let Some(record) = self.records.iter().find(|record| &record.id == id).cloned() else {
            return Err(Failure::new(
                FailureKind::InvalidInput,
                format!("record not listed: {id}"),
            ));
        };
        if self.wallet.address().is_none() {
            return Err(Failure::new(FailureKind::AuthRejected, MSG_CONNECT_FIRST));
        }
        let outcome = self.gate.toggle(&record).await.map_err(reveal_failure)?;
        info!(
            "event=reveal_toggle module=service status=ok record_id={} revealed={}",
            id,
            matches!(outcome, RevealOutcome::Revealed(_))
        );
        Ok(outcome)
    }

    pub fn reveal_state(&self, id: &RecordId) -> RevealState {
        self.gate.state(id)
    }

    pub fn hide_all(&mut self) {
        self.gate.hide_all();
    }

    /// Whether the connected wallet created `record`.
    pub fn is_owner(&self, record: &Record) -> bool {
        self.wallet
            .address()
            .is_some_and(|address| same_identity(&address, &record.owner))
    }

    /// Most recent records, oldest first, each with its own revealed mood.
    pub fn mood_trend(&self) -> Vec<TrendPoint> {
        self.records
            .iter()
            .take(TREND_WINDOW)
            .rev()
            .map(|record| TrendPoint {
                id: record.id.clone(),
                timestamp: record.timestamp,
                mood: self.gate.revealed(&record.id).map(|values| values.mood),
            })
            .collect()
    }

    /// Newest records whose annotations are shown as feedback.
    pub fn recent_feedback(&self) -> &[Record] {
        &self.records[..self.records.len().min(FEEDBACK_WINDOW)]
    }
}

fn store_failure(err: &StoreError) -> Failure {
    Failure::new(err.kind(), err.to_string())
}

fn reveal_failure(err: RevealError) -> Failure {
    Failure::new(err.kind(), err.to_string())
}

fn wallet_failure(err: WalletError) -> Failure {
    reveal_failure(RevealError::from(err))
}

fn submit_error_message(failure: &Failure) -> String {
    if failure.kind == FailureKind::AuthRejected {
        MSG_REJECTED.to_string()
    } else {
        format!("Submission failed: {}", failure.message)
    }
}

#[cfg(test)]
mod tests {
    use super::submit_error_message;
    use crate::error::{Failure, FailureKind};

    #[test]
    fn submit_messages_distinguish_rejection() {
        let rejected = Failure::new(FailureKind::AuthRejected, "declined");
        assert_eq!(submit_error_message(&rejected), "Transaction rejected by user");

        let failed = Failure::new(FailureKind::WriteFailure, "disk full");
        assert_eq!(submit_error_message(&failed), "Submission failed: disk full");
    }
}
