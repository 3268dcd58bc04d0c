//! Journal record model.
//!
//! # Responsibility
//! - Define `Record`, the unit stored under one per-record key.
//! - Define the JSON body written to the key/value collaborator.
//!
//! # Invariants
//! - `id`, `owner` and `timestamp` are fixed at creation.
//! - `encoded_mood`/`encoded_stress` are codec output, never plain values
//!   supplied by callers.
//! - `derived_annotation` is computed once at creation and never recomputed.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Lowest accepted mood/stress level for journal entries.
pub const LEVEL_MIN: u8 = 1;
/// Highest accepted mood/stress level for journal entries.
pub const LEVEL_MAX: u8 = 10;
/// Level preselected for a new draft.
pub const LEVEL_DEFAULT: u8 = 5;

/// Category preselected for a new draft.
pub const DEFAULT_CATEGORY: &str = "Daily Check-in";

const SUGGESTED_CATEGORIES: &[&str] = &[
    DEFAULT_CATEGORY,
    "Stressful Event",
    "Positive Moment",
    "Therapy Session",
    "General Reflection",
];

const ID_SUFFIX_LEN: usize = 9;

/// Returns the category labels offered to users.
///
/// Storage does not enforce membership; any label is persisted as-is.
pub fn suggested_categories() -> &'static [&'static str] {
    SUGGESTED_CATEGORIES
}

/// Opaque record identifier, also used as the per-record storage key suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh id: `<unix millis>-<random hex>`.
    ///
    /// The time component orders ids roughly by creation; the random suffix
    /// keeps concurrent writers from colliding without an index round trip.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}",
            unix_millis_now(),
            &suffix[..ID_SUFFIX_LEN]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One journal entry as seen by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    /// Codec-encoded mood level.
    pub encoded_mood: String,
    /// Codec-encoded stress level.
    pub encoded_stress: String,
    /// Seconds since unix epoch.
    pub timestamp: i64,
    /// Address-like identity of the creator.
    pub owner: String,
    pub category: String,
    pub note: String,
    /// Canned response derived from the plain levels at creation time.
    pub derived_annotation: String,
}

impl Record {
    /// Assembles a record from an id and its stored body.
    pub fn from_body(id: RecordId, body: RecordBody) -> Self {
        Self {
            id,
            encoded_mood: body.mood,
            encoded_stress: body.stress,
            timestamp: body.timestamp,
            owner: body.owner,
            category: body.category,
            note: body.note,
            derived_annotation: body.ai_response,
        }
    }

    /// Returns the body persisted under this record's key.
    pub fn to_body(&self) -> RecordBody {
        RecordBody {
            mood: self.encoded_mood.clone(),
            stress: self.encoded_stress.clone(),
            timestamp: self.timestamp,
            owner: self.owner.clone(),
            category: self.category.clone(),
            note: self.note.clone(),
            ai_response: self.derived_annotation.clone(),
        }
    }
}

/// Stored JSON body of one record.
///
/// Field names follow the deployed data (`mood`, `stress`, `aiResponse`);
/// generic `fieldA`/`fieldB`/`derivedAnnotation` names are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBody {
    #[serde(alias = "fieldA")]
    pub mood: String,
    #[serde(alias = "fieldB")]
    pub stress: String,
    pub timestamp: i64,
    pub owner: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "aiResponse", alias = "derivedAnnotation", default)]
    pub ai_response: String,
}

/// Plain-value input for one new journal entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub category: String,
    pub mood: u8,
    pub stress: u8,
    pub note: String,
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            mood: LEVEL_DEFAULT,
            stress: LEVEL_DEFAULT,
            note: String::new(),
        }
    }
}

impl EntryDraft {
    /// Checks level bounds before anything is encoded or written.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        check_level("mood", self.mood)?;
        check_level("stress", self.stress)?;
        Ok(())
    }
}

fn check_level(field: &'static str, value: u8) -> Result<(), DraftValidationError> {
    if (LEVEL_MIN..=LEVEL_MAX).contains(&value) {
        Ok(())
    } else {
        Err(DraftValidationError::LevelOutOfRange { field, value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftValidationError {
    LevelOutOfRange { field: &'static str, value: u8 },
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelOutOfRange { field, value } => write!(
                f,
                "{field} level {value} is outside {LEVEL_MIN}..={LEVEL_MAX}"
            ),
        }
    }
}

impl Error for DraftValidationError {}

/// Current time in whole seconds since unix epoch.
pub fn unix_seconds_now() -> i64 {
    (unix_millis_now() / 1000) as i64
}

fn unix_millis_now() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
