//! Persisted setup flags and the storage port they live behind.
//!
//! Each flag is a boolean stored under a string key as `"true"` or `"false"`.
//! A missing key reads as `false`, and so does any value other than the exact
//! string `"true"`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;

/// Stored representation of `true`.
pub const TRUE_VALUE: &str = "true";

/// Stored representation of `false`.
pub const FALSE_VALUE: &str = "false";

/// A named boolean persisted in the flag store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// The onboarding slides were completed.
    SeenOnboarding,
    /// The caregiver is signed in.
    Authenticated,
    /// The initial setup wizard was finished.
    CompletedSetup,
    /// At least one elderly profile was registered.
    ElderlyRegistered,
    /// At least one location was saved.
    LocationsRegistered,
    /// At least one reminder was configured.
    NotificationsConfigured,
}

impl Flag {
    /// Every flag, in a stable order.
    pub const ALL: [Flag; 6] = [
        Flag::SeenOnboarding,
        Flag::Authenticated,
        Flag::CompletedSetup,
        Flag::ElderlyRegistered,
        Flag::LocationsRegistered,
        Flag::NotificationsConfigured,
    ];

    /// The store key for this flag.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SeenOnboarding => "@has_seen_onboarding",
            Self::Authenticated => "@is_authenticated",
            Self::CompletedSetup => "@has_completed_setup",
            Self::ElderlyRegistered => "elderlyRegistered",
            Self::LocationsRegistered => "locationsRegistered",
            Self::NotificationsConfigured => "notificationsConfigured",
        }
    }

    /// Look a flag up by its store key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.key() == key)
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Decode a stored flag value.
#[must_use]
pub fn decode(value: &str) -> bool {
    value == TRUE_VALUE
}

/// Encode a flag value for storage.
#[must_use]
pub const fn encode(value: bool) -> &'static str {
    if value {
        TRUE_VALUE
    } else {
        FALSE_VALUE
    }
}

/// Durable key-value storage for setup flags.
///
/// Implementations are passed explicitly to the gate and the wizard, so
/// tests can substitute an in-memory store.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Read a flag. `None` means the flag was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, flag: Flag) -> Result<Option<bool>>;

    /// Write a flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn set(&self, flag: Flag, value: bool) -> Result<()>;
}

/// Read a flag, treating absence and read failures as `false`.
///
/// Failures are logged and swallowed: repeating a step is preferable to
/// skipping a required one.
pub async fn read_or_false<S>(store: &S, flag: Flag) -> bool
where
    S: FlagStore + ?Sized,
{
    match store.get(flag).await {
        Ok(value) => value.unwrap_or(false),
        Err(e) => {
            warn!("Failed to read flag {}, treating as unset: {}", flag, e);
            false
        }
    }
}

/// In-memory flag store.
///
/// Holds raw string values the same way the durable store does, so stored
/// values other than `"true"` behave identically.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryFlagStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given flags already set.
    #[must_use]
    pub fn with_flags(flags: &[(Flag, bool)]) -> Self {
        let values = flags
            .iter()
            .map(|(flag, value)| (flag.key().to_string(), encode(*value).to_string()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    /// Store a raw string under a key, bypassing encoding.
    pub async fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(key.into(), value.into());
    }

    /// Read the raw string stored under a key.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get(&self, flag: Flag) -> Result<Option<bool>> {
        Ok(self
            .values
            .read()
            .await
            .get(flag.key())
            .map(|value| decode(value)))
    }

    async fn set(&self, flag: Flag, value: bool) -> Result<()> {
        debug!("Setting flag {} = {}", flag, value);
        self.values
            .write()
            .await
            .insert(flag.key().to_string(), encode(value).to_string());
        Ok(())
    }
}

/// Memory store whose reads stay pending until [`HeldReads::release`].
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct HeldReads {
    inner: MemoryFlagStore,
    gate: tokio::sync::Semaphore,
    pending: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl HeldReads {
    pub(crate) fn with_flags(flags: &[(Flag, bool)]) -> Self {
        Self {
            inner: MemoryFlagStore::with_flags(flags),
            gate: tokio::sync::Semaphore::new(0),
            pending: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Yield until `count` reads are parked.
    pub(crate) async fn wait_for_pending(&self, count: usize) {
        while self.pending.load(std::sync::atomic::Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    /// Let every parked and future read through.
    pub(crate) fn release(&self) {
        self.gate.close();
    }
}

#[cfg(test)]
#[async_trait]
impl FlagStore for HeldReads {
    async fn get(&self, flag: Flag) -> Result<Option<bool>> {
        self.pending.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        // Closed semaphore: acquire fails immediately for every waiter.
        let _ = self.gate.acquire().await;
        self.inner.get(flag).await
    }

    async fn set(&self, flag: Flag, value: bool) -> Result<()> {
        self.inner.set(flag, value).await
    }
}
