//! Use-case services over the record store and wallet.
//!
//! # Responsibility
//! - Gate decoded values behind wallet signatures.
//! - Keep UI callers decoupled from storage and codec details.

pub mod journal_service;
pub mod reveal_gate;
