//! Local development wallet.
//!
//! Signs with a blake3 keyed hash instead of an account key. Good enough to
//! drive the reveal flow from the CLI and tests; it proves nothing on chain.

use super::{Wallet, WalletError, WalletResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const DEV_CHAIN_ID: u64 = 31337;

/// How the wallet answers signature prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignPolicy {
    Approve,
    Reject,
    /// Approves after sleeping, simulating a prompt left open.
    ApproveAfter(Duration),
}

#[derive(Debug)]
pub struct DevWallet {
    secret: [u8; 32],
    address: String,
    chain_id: u64,
    connected: AtomicBool,
    policy: Mutex<SignPolicy>,
    sign_requests: AtomicUsize,
}

impl DevWallet {
    /// Derives a deterministic wallet from a seed phrase.
    pub fn from_seed(seed: &str) -> Self {
        let secret = *blake3::hash(seed.as_bytes()).as_bytes();
        let address_hash = blake3::hash(&secret);
        let address = format!("0x{}", hex::encode(&address_hash.as_bytes()[..20]));
        Self {
            secret,
            address,
            chain_id: DEV_CHAIN_ID,
            connected: AtomicBool::new(false),
            policy: Mutex::new(SignPolicy::Approve),
            sign_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Connected from the start, as if the user approved earlier.
    pub fn connected(self) -> Self {
        self.connected.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_policy(&self, policy: SignPolicy) {
        *self
            .policy
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = policy;
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Number of signature prompts shown so far, answered or not.
    pub fn sign_requests(&self) -> usize {
        self.sign_requests.load(Ordering::SeqCst)
    }

    /// Checks a signature produced by this wallet.
    pub fn verify(&self, message: &str, signature: &str) -> bool {
        self.signature_for(message) == signature
    }

    fn signature_for(&self, message: &str) -> String {
        format!(
            "0x{}",
            blake3::keyed_hash(&self.secret, message.as_bytes()).to_hex()
        )
    }

    fn policy(&self) -> SignPolicy {
        *self
            .policy
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Wallet for DevWallet {
    fn connect(&self) -> WalletResult<String> {
        if self.policy() == SignPolicy::Reject {
            return Err(WalletError::Rejected);
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.address.clone())
    }

    fn address(&self) -> Option<String> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| self.address.clone())
    }

    fn sign_message(&self, message: &str) -> WalletResult<String> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::NotConnected);
        }
        self.sign_requests.fetch_add(1, Ordering::SeqCst);
        match self.policy() {
            SignPolicy::Approve => Ok(self.signature_for(message)),
            SignPolicy::Reject => Err(WalletError::Rejected),
            SignPolicy::ApproveAfter(delay) => {
                std::thread::sleep(delay);
                Ok(self.signature_for(message))
            }
        }
    }

    fn chain_id(&self) -> WalletResult<u64> {
        Ok(self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{DevWallet, SignPolicy};
    use crate::identity::{is_address_like, Wallet, WalletError};

    #[test]
    fn derives_stable_address_from_seed() {
        let first = DevWallet::from_seed("alice");
        let second = DevWallet::from_seed("alice");
        let other = DevWallet::from_seed("bob");

        let address = first.connect().unwrap();
        assert!(is_address_like(&address));
        assert_eq!(Some(address), second.connected().address());
        assert_ne!(first.address(), other.connected().address());
    }

    #[test]
    fn signs_only_when_connected_and_approved() {
        let wallet = DevWallet::from_seed("alice");
        assert_eq!(wallet.sign_message("m"), Err(WalletError::NotConnected));

        wallet.connect().unwrap();
        let signature = wallet.sign_message("m").unwrap();
        assert!(wallet.verify("m", &signature));
        assert!(!wallet.verify("other", &signature));

        wallet.set_policy(SignPolicy::Reject);
        assert_eq!(wallet.sign_message("m"), Err(WalletError::Rejected));
        assert_eq!(wallet.sign_requests(), 2);
    }
}
