//! Journal domain model.
//!
//! # Responsibility
//! - Define the canonical journal record and its storage wire shape.
//! - Keep private field values out of the model: records only ever hold
//!   codec-encoded strings.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Records are append-only: no update or delete path exists.

pub mod record;
