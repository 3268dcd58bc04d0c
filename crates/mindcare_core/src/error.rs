//! Caller-facing failure taxonomy.
//!
//! Module errors keep their own detail; `Failure` is the flattened shape the
//! presentation layer pattern-matches on.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Store not reachable or disabled.
    CollaboratorUnavailable,
    /// Malformed index or record data.
    ParseFailure,
    /// Index or body write refused.
    WriteFailure,
    /// User declined a wallet connect or signature prompt.
    AuthRejected,
    /// Wallet prompt left unanswered past the configured bound.
    Timeout,
    /// Caller input rejected before any collaborator was touched.
    InvalidInput,
    Unknown,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CollaboratorUnavailable => "collaborator_unavailable",
            Self::ParseFailure => "parse_failure",
            Self::WriteFailure => "write_failure",
            Self::AuthRejected => "auth_rejected",
            Self::Timeout => "timeout",
            Self::InvalidInput => "invalid_input",
            Self::Unknown => "unknown",
        }
    }
}

/// Typed failure returned by controller operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl Error for Failure {}
