//! In-process key/value store.

use super::{KeyValueStore, KvError, KvResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

const DEFAULT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Map-backed store with switches for availability and write failures.
#[derive(Debug)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    failing_keys: Mutex<BTreeSet<String>>,
    available: AtomicBool,
    writes_authorized: AtomicBool,
    writes: AtomicUsize,
    address: String,
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::with_address(DEFAULT_ADDRESS)
    }

    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            failing_keys: Mutex::new(BTreeSet::new()),
            available: AtomicBool::new(true),
            writes_authorized: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
            address: address.into(),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Simulates a signer that declines every later write.
    pub fn deny_writes(&self) {
        self.writes_authorized.store(false, Ordering::SeqCst);
    }

    /// Makes every later `set` on `key` fail with `WriteRejected`.
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        lock(&self.failing_keys).insert(key.into());
    }

    /// Seeds raw bytes, bypassing write-failure injection.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        lock(&self.entries).insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryKvStore {
    fn is_available(&self) -> KvResult<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        Ok(lock(&self.entries).get(key).cloned().unwrap_or_default())
    }

    fn set(&self, key: &str, value: &[u8]) -> KvResult<()> {
        if !self.writes_authorized.load(Ordering::SeqCst) {
            return Err(KvError::Unauthorized("user rejected transaction".to_string()));
        }
        if lock(&self.failing_keys).contains(key) {
            return Err(KvError::WriteRejected {
                key: key.to_string(),
                reason: "write refused by store".to_string(),
            });
        }
        lock(&self.entries).insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn address(&self) -> String {
        self.address.clone()
    }
}

// A poisoned map is still structurally valid for this store.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
