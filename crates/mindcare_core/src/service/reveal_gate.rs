//! Signature-gated reveal of encoded record fields.
//!
//! # Responsibility
//! - Build the canonical challenge message for one session.
//! - Ask the wallet to sign it, with a bounded wait.
//! - Track `Hidden -> Revealing -> Revealed -> Hidden` per record.
//!
//! # Invariants
//! - Hiding never prompts the wallet; revealing always does.
//! - Decoded values live only in the `Revealed` state of their own record.
//! - Any failure while revealing leaves the record `Hidden`.

use crate::codec::{CodecError, FieldCodec, TaggedBase64Codec};
use crate::config::JournalConfig;
use crate::error::FailureKind;
use crate::identity::{Wallet, WalletError};
use crate::model::record::{unix_seconds_now, Record, RecordId};
use log::{info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PUBLIC_KEY_HEX_LEN: usize = 2000;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Parameters embedded in the signed challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeParams {
    pub public_key: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub start_timestamp: i64,
    pub duration_days: u32,
}

impl ChallengeParams {
    /// Builds session parameters: fresh key material, store address and
    /// wallet chain id unless `config` overrides them.
    pub fn for_session(
        wallet: &dyn Wallet,
        store_address: String,
        config: &JournalConfig,
    ) -> Result<Self, RevealError> {
        let chain_id = match config.chain_id {
            Some(chain_id) => chain_id,
            None => wallet.chain_id().map_err(RevealError::from)?,
        };
        Ok(Self {
            public_key: generate_public_key(),
            contract_address: config
                .contract_address
                .clone()
                .unwrap_or(store_address),
            chain_id,
            start_timestamp: unix_seconds_now(),
            duration_days: config.duration_days,
        })
    }

    /// Canonical newline-joined challenge text. Labels and order are fixed.
    pub fn message(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            self.contract_address,
            self.chain_id,
            self.start_timestamp,
            self.duration_days
        )
    }
}

/// `0x` followed by 2000 random lowercase hex digits.
pub fn generate_public_key() -> String {
    let mut rng = rand::thread_rng();
    let mut key = String::with_capacity(PUBLIC_KEY_HEX_LEN + 2);
    key.push_str("0x");
    for _ in 0..PUBLIC_KEY_HEX_LEN {
        key.push(char::from(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())]));
    }
    key
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealedValues {
    pub mood: f64,
    pub stress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealing,
    Revealed(RevealedValues),
}

/// Result of one toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealOutcome {
    Revealed(RevealedValues),
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealError {
    /// User dismissed the signature prompt.
    Rejected,
    NotConnected,
    Timeout(Duration),
    Wallet(WalletError),
    Decode(CodecError),
    Internal(String),
}

impl RevealError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Rejected | Self::NotConnected => FailureKind::AuthRejected,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Wallet(WalletError::Unavailable(_)) => FailureKind::CollaboratorUnavailable,
            Self::Decode(_) => FailureKind::ParseFailure,
            Self::Wallet(_) | Self::Internal(_) => FailureKind::Unknown,
        }
    }
}

impl From<WalletError> for RevealError {
    fn from(value: WalletError) -> Self {
        match value {
            WalletError::Rejected => Self::Rejected,
            WalletError::NotConnected => Self::NotConnected,
            other => Self::Wallet(other),
        }
    }
}

impl From<CodecError> for RevealError {
    fn from(value: CodecError) -> Self {
        Self::Decode(value)
    }
}

impl Display for RevealError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected => write!(f, "signature request rejected by user"),
            Self::NotConnected => write!(f, "please connect wallet first"),
            Self::Timeout(waited) => write!(
                f,
                "signature request timed out after {}s",
                waited.as_secs()
            ),
            Self::Wallet(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "decryption failed: {err}"),
            Self::Internal(message) => write!(f, "signature request failed: {message}"),
        }
    }
}

impl Error for RevealError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Wallet(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-session reveal gate.
pub struct RevealGate<C = TaggedBase64Codec> {
    wallet: Arc<dyn Wallet>,
    codec: C,
    params: ChallengeParams,
    signature_timeout: Duration,
    states: HashMap<RecordId, RevealState>,
}

impl RevealGate<TaggedBase64Codec> {
    pub fn new(wallet: Arc<dyn Wallet>, params: ChallengeParams, signature_timeout: Duration) -> Self {
        Self::with_codec(wallet, TaggedBase64Codec, params, signature_timeout)
    }
}

impl<C: FieldCodec> RevealGate<C> {
    pub fn with_codec(
        wallet: Arc<dyn Wallet>,
        codec: C,
        params: ChallengeParams,
        signature_timeout: Duration,
    ) -> Self {
        Self {
            wallet,
            codec,
            params,
            signature_timeout,
            states: HashMap::new(),
        }
    }

    pub fn params(&self) -> &ChallengeParams {
        &self.params
    }

    pub fn state(&self, id: &RecordId) -> RevealState {
        self.states.get(id).copied().unwrap_or_default()
    }

    /// Decoded values for `id` while it is revealed.
    pub fn revealed(&self, id: &RecordId) -> Option<RevealedValues> {
        match self.state(id) {
            RevealState::Revealed(values) => Some(values),
            RevealState::Hidden | RevealState::Revealing => None,
        }
    }

    /// Hides a revealed record, or reveals a hidden one.
    pub async fn toggle(&mut self, record: &Record) -> Result<RevealOutcome, RevealError> {
        if let RevealState::Revealed(_) = self.state(&record.id) {
            self.hide(&record.id);
            return Ok(RevealOutcome::Hidden);
        }
        self.request_reveal(record)
            .await
            .map(RevealOutcome::Revealed)
    }

    /// Signs the challenge and decodes both fields of `record`.
    ///
    /// Always prompts the wallet, even if the record is already revealed.
    /// Dropping the returned future before it completes leaves the record
    /// `Hidden`.
    pub async fn request_reveal(&mut self, record: &Record) -> Result<RevealedValues, RevealError> {
        let started_at = Instant::now();
        let wallet = Arc::clone(&self.wallet);
        let message = self.params.message();
        let signature_timeout = self.signature_timeout;
        let pending = PendingReveal::enter(&mut self.states, record.id.clone());

        let result = match sign_challenge(wallet, message, signature_timeout).await {
            Ok(_signature) => decode_fields(&self.codec, record),
            Err(err) => Err(err),
        };

        match result {
            Ok(values) => {
                pending.resolve(values);
                info!(
                    "event=record_reveal module=reveal status=ok record_id={} duration_ms={}",
                    record.id,
                    started_at.elapsed().as_millis()
                );
                Ok(values)
            }
            Err(err) => {
                drop(pending);
                warn!(
                    "event=record_reveal module=reveal status=error record_id={} error_code={} error={}",
                    record.id,
                    err.kind().as_str(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn hide(&mut self, id: &RecordId) {
        self.states.remove(id);
    }

    pub fn hide_all(&mut self) {
        self.states.clear();
    }
}

/// Holds a record in `Revealing`; anything but `resolve` puts it back to
/// `Hidden`, including the owning future being dropped mid-await.
struct PendingReveal<'a> {
    states: &'a mut HashMap<RecordId, RevealState>,
    id: RecordId,
    resolved: bool,
}

impl<'a> PendingReveal<'a> {
    fn enter(states: &'a mut HashMap<RecordId, RevealState>, id: RecordId) -> Self {
        states.insert(id.clone(), RevealState::Revealing);
        Self {
            states,
            id,
            resolved: false,
        }
    }

    fn resolve(mut self, values: RevealedValues) {
        self.states
            .insert(self.id.clone(), RevealState::Revealed(values));
        self.resolved = true;
    }
}

impl Drop for PendingReveal<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.states.remove(&self.id);
        }
    }
}

fn decode_fields<C: FieldCodec>(codec: &C, record: &Record) -> Result<RevealedValues, RevealError> {
    Ok(RevealedValues {
        mood: codec.decode(&record.encoded_mood)?,
        stress: codec.decode(&record.encoded_stress)?,
    })
}

async fn sign_challenge(
    wallet: Arc<dyn Wallet>,
    message: String,
    signature_timeout: Duration,
) -> Result<String, RevealError> {
    // Wallet prompts block on the user; keep them off the async workers.
    let signing = tokio::task::spawn_blocking(move || wallet.sign_message(&message));

    match tokio::time::timeout(signature_timeout, signing).await {
        Err(_) => Err(RevealError::Timeout(signature_timeout)),
        Ok(Err(join_err)) => Err(RevealError::Internal(join_err.to_string())),
        Ok(Ok(signed)) => signed.map_err(RevealError::from),
    }
}
