//! Wallet/identity collaborator contract.
//!
//! # Responsibility
//! - Describe the wallet capability used to connect and sign challenges.
//! - Normalize address-like identities for owner checks and display.
//!
//! # Invariants
//! - A user dismissing a prompt surfaces as `WalletError::Rejected`, never as
//!   a generic error.
//! - Owner comparison is case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod dev_wallet;

pub use dev_wallet::{DevWallet, SignPolicy};

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"));

pub type WalletResult<T> = Result<T, WalletError>;

/// Identity capability supplied by the embedding application.
///
/// Calls may block on user interaction; async callers run them on a
/// blocking thread.
pub trait Wallet: Send + Sync {
    /// Prompts for connection and returns the connected address.
    fn connect(&self) -> WalletResult<String>;
    /// Connected address, if any.
    fn address(&self) -> Option<String>;
    /// Signs `message` verbatim.
    fn sign_message(&self, message: &str) -> WalletResult<String>;
    fn chain_id(&self) -> WalletResult<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// User declined the connect or signature prompt.
    Rejected,
    NotConnected,
    Unavailable(String),
    Other(String),
}

impl Display for WalletError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected => write!(f, "request rejected by user"),
            Self::NotConnected => write!(f, "wallet is not connected"),
            Self::Unavailable(reason) => write!(f, "wallet unavailable: {reason}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for WalletError {}

/// Whether `value` looks like a 20-byte hex account address.
pub fn is_address_like(value: &str) -> bool {
    ADDRESS_RE.is_match(value.trim())
}

/// Case-insensitive identity match.
pub fn same_identity(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// `0x1234...abcd` form for display; non-address values pass through.
pub fn short_address(value: &str) -> String {
    let trimmed = value.trim();
    if !is_address_like(trimmed) {
        return trimmed.to_string();
    }
    format!("{}...{}", &trimmed[..6], &trimmed[trimmed.len() - 4..])
}
