//! Record store over a key/value collaborator.
//!
//! # Responsibility
//! - List, read and create journal records.
//! - Encode private levels and derive the annotation at creation time.
//!
//! # Invariants
//! - `list` never fails: unavailable stores, malformed indexes, missing or
//!   unparsable bodies and duplicate ids are logged and skipped.
//! - Index entries that are neither strings nor numbers are skipped, not
//!   fatal; only an index that is not a JSON array counts as malformed.
//! - `create` never rewrites an index it could not parse, and keeps entries
//!   it skipped when appending.
//! - A body written without its index entry (orphan) stays invisible to
//!   `list`; this window is accepted, not repaired.

use crate::codec::{score, FieldCodec, TaggedBase64Codec};
use crate::config::{JournalConfig, DEFAULT_INDEX_KEY, DEFAULT_RECORD_KEY_PREFIX};
use crate::error::FailureKind;
use crate::identity::same_identity;
use crate::kv::{KeyValueStore, KvError};
use crate::model::record::{unix_seconds_now, Record, RecordBody, RecordId};
use log::{error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const MAX_ID_ATTEMPTS: usize = 8;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Store reported itself unavailable.
    Unavailable,
    Read { key: String, source: KvError },
    Parse { key: String, message: String },
    /// `orphaned` is set when the body landed but the index update did not.
    Write {
        key: String,
        source: KvError,
        orphaned: Option<RecordId>,
    },
    Encode(String),
}

impl StoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unavailable => FailureKind::CollaboratorUnavailable,
            Self::Read {
                source: KvError::Unavailable(_),
                ..
            } => FailureKind::CollaboratorUnavailable,
            Self::Read { .. } => FailureKind::Unknown,
            Self::Parse { .. } => FailureKind::ParseFailure,
            Self::Write {
                source: KvError::Unauthorized(_),
                ..
            } => FailureKind::AuthRejected,
            Self::Write { .. } => FailureKind::WriteFailure,
            Self::Encode(_) => FailureKind::Unknown,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "record store is unavailable"),
            Self::Read { key, source } => write!(f, "failed to read `{key}`: {source}"),
            Self::Parse { key, message } => write!(f, "malformed data at `{key}`: {message}"),
            Self::Write {
                key,
                source,
                orphaned: Some(id),
            } => write!(
                f,
                "failed to write `{key}`: {source} (record {id} stored but not indexed)"
            ),
            Self::Write { key, source, .. } => write!(f, "failed to write `{key}`: {source}"),
            Self::Encode(message) => write!(f, "failed to encode record: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Plain-value input for `RecordStore::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub category: String,
    pub mood: f64,
    pub stress: f64,
    pub note: String,
    pub owner: String,
}

/// Index + per-record bodies, stored through `S`, encoded with `C`.
pub struct RecordStore<S, C = TaggedBase64Codec> {
    kv: S,
    codec: C,
    index_key: String,
    record_key_prefix: String,
}

impl<S: KeyValueStore> RecordStore<S, TaggedBase64Codec> {
    /// Store with the default key layout and codec.
    pub fn new(kv: S) -> Self {
        Self::with_codec(kv, TaggedBase64Codec)
    }
}

impl<S: KeyValueStore, C: FieldCodec> RecordStore<S, C> {
    pub fn with_codec(kv: S, codec: C) -> Self {
        Self {
            kv,
            codec,
            index_key: DEFAULT_INDEX_KEY.to_string(),
            record_key_prefix: DEFAULT_RECORD_KEY_PREFIX.to_string(),
        }
    }

    /// Applies the key layout from `config`.
    pub fn configured(mut self, config: &JournalConfig) -> Self {
        self.index_key = config.index_key.clone();
        self.record_key_prefix = config.record_key_prefix.clone();
        self
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn index_key(&self) -> &str {
        &self.index_key
    }

    /// Storage key for one record body.
    pub fn record_key(&self, id: &RecordId) -> String {
        format!("{}{}", self.record_key_prefix, id)
    }

    /// Lists every readable indexed record, newest first.
    pub fn list(&self) -> Vec<Record> {
        let started_at = Instant::now();
        if !self.probe_available() {
            return Vec::new();
        }

        let ids = match self.read_index() {
            Ok(ids) => ids,
            Err(err) => {
                warn!(
                    "event=records_list module=repo status=degraded error_code={} error={}",
                    err.kind().as_str(),
                    err
                );
                return Vec::new();
            }
        };

        let mut seen = HashSet::with_capacity(ids.len());
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0usize;
        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            match self.get(&id) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    skipped += 1;
                    warn!("event=record_read module=repo status=missing record_id={id}");
                }
                Err(err) => {
                    skipped += 1;
                    warn!(
                        "event=record_read module=repo status=skipped record_id={id} error_code={} error={}",
                        err.kind().as_str(),
                        err
                    );
                }
            }
        }

        records.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        info!(
            "event=records_list module=repo status=ok count={} skipped={} duration_ms={}",
            records.len(),
            skipped,
            started_at.elapsed().as_millis()
        );
        records
    }

    /// Lists records whose owner matches `owner`, newest first.
    pub fn list_by_owner(&self, owner: &str) -> Vec<Record> {
        self.list()
            .into_iter()
            .filter(|record| same_identity(&record.owner, owner))
            .collect()
    }

    /// Reads one record body; `None` when nothing is stored for `id`.
    pub fn get(&self, id: &RecordId) -> StoreResult<Option<Record>> {
        let key = self.record_key(id);
        let bytes = self.kv.get(&key).map_err(|source| StoreError::Read {
            key: key.clone(),
            source,
        })?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let body: RecordBody =
            serde_json::from_slice(&bytes).map_err(|err| StoreError::Parse {
                key,
                message: err.to_string(),
            })?;
        Ok(Some(Record::from_body(id.clone(), body)))
    }

    /// Reads the id index. Missing or blank index reads as empty.
    ///
    /// Numeric entries are read as their decimal text; any other non-string
    /// entry is skipped. Only an index that is not a JSON array is an error.
    pub fn read_index(&self) -> StoreResult<Vec<RecordId>> {
        let entries = self.read_index_entries()?;
        Ok(entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let id = index_entry_id(entry);
                if id.is_none() {
                    warn!(
                        "event=index_entry module=repo status=skipped position={position} kind={}",
                        json_kind(entry)
                    );
                }
                id
            })
            .collect())
    }

    fn read_index_entries(&self) -> StoreResult<Vec<Value>> {
        let bytes = self
            .kv
            .get(&self.index_key)
            .map_err(|source| StoreError::Read {
                key: self.index_key.clone(),
                source,
            })?;
        let text = std::str::from_utf8(&bytes).map_err(|err| StoreError::Parse {
            key: self.index_key.clone(),
            message: err.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(text).map_err(|err| StoreError::Parse {
            key: self.index_key.clone(),
            message: err.to_string(),
        })
    }

    /// Encodes, annotates and persists one new record.
    ///
    /// Writes the body first, then the index with the new id appended.
    pub fn create(&self, new: NewRecord) -> StoreResult<Record> {
        self.create_at(new, unix_seconds_now())
    }

    /// `create` with an explicit creation timestamp (seconds).
    pub fn create_at(&self, new: NewRecord, timestamp: i64) -> StoreResult<Record> {
        let started_at = Instant::now();
        if !self.probe_available() {
            return Err(StoreError::Unavailable);
        }

        let mut entries = self.read_index_entries()?;
        let existing: Vec<RecordId> = entries.iter().filter_map(index_entry_id).collect();
        let id = self.fresh_id(&existing);
        let record = Record {
            id: id.clone(),
            encoded_mood: self.codec.encode(new.mood),
            encoded_stress: self.codec.encode(new.stress),
            timestamp,
            owner: new.owner,
            category: new.category,
            note: new.note,
            derived_annotation: score(new.mood, new.stress).to_string(),
        };

        let body = serde_json::to_vec(&record.to_body())
            .map_err(|err| StoreError::Encode(err.to_string()))?;
        let record_key = self.record_key(&id);
        self.kv
            .set(&record_key, &body)
            .map_err(|source| {
                error!(
                    "event=record_create module=repo status=error stage=body record_id={id} error={source}"
                );
                StoreError::Write {
                    key: record_key.clone(),
                    source,
                    orphaned: None,
                }
            })?;

        // Skipped entries are written back untouched.
        entries.push(Value::String(id.as_str().to_string()));
        let index =
            serde_json::to_vec(&entries).map_err(|err| StoreError::Encode(err.to_string()))?;
        if let Err(source) = self.kv.set(&self.index_key, &index) {
            error!(
                "event=record_create module=repo status=orphaned stage=index record_id={id} error={source}"
            );
            return Err(StoreError::Write {
                key: self.index_key.clone(),
                source,
                orphaned: Some(id),
            });
        }

        info!(
            "event=record_create module=repo status=ok record_id={} index_len={} duration_ms={}",
            id,
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(record)
    }

    fn probe_available(&self) -> bool {
        match self.kv.is_available() {
            Ok(true) => true,
            Ok(false) => {
                info!("event=kv_probe module=repo status=unavailable");
                false
            }
            Err(err) => {
                warn!("event=kv_probe module=repo status=error error={err}");
                false
            }
        }
    }

    fn fresh_id(&self, existing: &[RecordId]) -> RecordId {
        let mut candidate = RecordId::generate();
        for _ in 1..MAX_ID_ATTEMPTS {
            if !existing.contains(&candidate) {
                break;
            }
            candidate = RecordId::generate();
        }
        candidate
    }
}

/// Storage id for one index entry: strings as-is, numbers as decimal text.
fn index_entry_id(entry: &Value) -> Option<RecordId> {
    match entry {
        Value::String(id) => Some(RecordId::from(id.as_str())),
        Value::Number(number) => {
            let text = match (number.as_i64(), number.as_u64(), number.as_f64()) {
                (Some(value), _, _) => value.to_string(),
                (None, Some(value), _) => value.to_string(),
                (None, None, Some(value)) => value.to_string(),
                (None, None, None) => return None,
            };
            Some(RecordId::from(text))
        }
        _ => None,
    }
}

fn json_kind(entry: &Value) -> &'static str {
    match entry {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
