//! Persistence of journal records over the key/value collaborator.
//!
//! # Responsibility
//! - Maintain the id index and the per-record bodies.
//! - Contain per-item read failures so one bad record never hides the rest.
//!
//! # Invariants
//! - The index is the only source of enumerable ids.
//! - Bodies are written before the index references them.

pub mod record_store;
