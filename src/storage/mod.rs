//! Durable key-value store with a primary and a fallback backend.
//!
//! Values are stored as JSON text. Every operation tries the primary backend
//! first and transparently retries against the fallback; callers only ever
//! see the settled result of the last backend tried.

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::config;
use crate::error::{QuizError, Result};
use crate::models::{ContentPack, PurchaseRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// A raw string store keyed by namespaced keys.
pub trait Backend: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &str;

    /// Read the value stored under `key`; `Ok(None)` when absent.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Reject keys that could escape a directory-backed store.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(QuizError::InvalidArgument(format!(
            "invalid storage key: {:?}",
            key
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

pub struct KeyValueStore {
    primary: Box<dyn Backend>,
    fallback: Box<dyn Backend>,
}

impl KeyValueStore {
    pub fn new(primary: Box<dyn Backend>, fallback: Box<dyn Backend>) -> Self {
        Self { primary, fallback }
    }

    /// Store backed by files in `primary_dir`, falling back to `fallback_dir`.
    pub fn with_dirs<P: AsRef<Path>, F: AsRef<Path>>(primary_dir: P, fallback_dir: F) -> Self {
        Self::new(
            Box::new(FileBackend::new(primary_dir)),
            Box::new(FileBackend::new(fallback_dir)),
        )
    }

    /// Store in the platform data directory with the cache directory as fallback.
    pub fn open_default() -> Self {
        Self::with_dirs(config::default_storage_dir(), config::default_fallback_dir())
    }

    /// Read and deserialize the value under `key`.
    ///
    /// A primary error, miss or unreadable value falls through to the
    /// fallback. Anything the fallback cannot produce reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.primary.read(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => return Some(value),
                Err(e) => tracing::warn!(
                    key,
                    backend = self.primary.name(),
                    error = %e,
                    "stored value is unreadable; trying fallback"
                ),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(
                key,
                backend = self.primary.name(),
                error = %e,
                "primary read failed; trying fallback"
            ),
        }

        match self.fallback.read(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(key, backend = self.fallback.name(), error = %e, "stored value is unreadable");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, backend = self.fallback.name(), error = %e, "fallback read failed");
                None
            }
        }
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// On a primary failure the fallback result is returned instead.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        match self.primary.write(key, &raw) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    key,
                    backend = self.primary.name(),
                    error = %e,
                    "primary write failed; writing to fallback"
                );
                self.fallback.write(key, &raw)
            }
        }
    }

    // -- Typed records -----------------------------------------------------

    /// Save a content pack under `content_pack_{slug}`.
    pub fn save_content_pack(&self, slug: &str, pack: &ContentPack) -> Result<()> {
        self.set(&config::content_pack_key(slug), pack)
    }

    pub fn load_content_pack(&self, slug: &str) -> Option<ContentPack> {
        self.get(&config::content_pack_key(slug))
    }

    /// The owned product ids; empty when nothing was ever recorded.
    pub fn load_purchases(&self) -> PurchaseRecord {
        self.get(config::PURCHASES_KEY).unwrap_or_default()
    }

    pub fn save_purchases(&self, purchases: &PurchaseRecord) -> Result<()> {
        self.set(config::PURCHASES_KEY, purchases)
    }

    /// Record ownership of `product_id`. Returns `false` (and writes
    /// nothing) if it was already owned.
    pub fn add_purchase(&self, product_id: &str) -> Result<bool> {
        let mut purchases = self.load_purchases();
        if !purchases.insert(product_id) {
            return Ok(false);
        }
        self.save_purchases(&purchases)?;
        Ok(true)
    }

    pub fn is_purchased(&self, product_id: &str) -> bool {
        self.load_purchases().contains(product_id)
    }

    /// Labels of the primary and fallback backends.
    pub fn describe(&self) -> String {
        format!("{} -> {}", self.primary.name(), self.fallback.name())
    }
}
