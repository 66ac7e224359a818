//! Kids quiz engine.
//!
//! Fetches the quiz catalog from the content server, caches it for a few
//! minutes, turns raw catalog entries into playable [`ContentPack`]s, keeps
//! track of purchased packs in durable storage and drives a single
//! playthrough as a [`QuizSession`].
//!
//! When the server cannot be reached the engine quietly serves a built-in
//! sample catalog instead of failing.
//!
//! # Quick start
//!
//! ```no_run
//! use kids_quiz::KidsQuiz;
//!
//! let quiz = KidsQuiz::builder().build().unwrap();
//!
//! // Menu entries
//! let packs = quiz.summaries();
//!
//! // One playable pack
//! let animals = quiz.content_pack("животные");
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod purchases;
pub mod sample;
pub mod session;
pub mod storage;
pub mod transform;

pub use api::{ContentApi, HttpApi};
#[cfg(feature = "async")]
pub use async_client::AsyncKidsQuiz;
pub use cache::{CacheOptions, CatalogFetch, Clock, ContentCache, SystemClock};
pub use error::{QuizError, Result};
pub use models::{
    Catalog, CatalogEntry, ContentPack, PackSummary, PurchaseReceipt, PurchaseRecord, Task,
    TaskChoice, Verification,
};
pub use purchases::{MockInitiator, PurchaseInitiator, PurchaseOutcome, PurchaseQuery};
pub use session::{QuizSession, SessionConfig, SessionHost, SessionState};
pub use storage::{Backend, FileBackend, KeyValueStore, MemoryBackend};
pub use transform::{find_pack_by_slug, slugify, transform};

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// KidsQuizBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`KidsQuiz`] instance.
///
/// Use [`KidsQuiz::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](KidsQuizBuilder::build).
pub struct KidsQuizBuilder {
    base_url: Option<String>,
    timeout: Duration,
    storage_dir: Option<PathBuf>,
    fallback_dir: Option<PathBuf>,
    offline: bool,
    locale: String,
    cache_ttl: Duration,
    free_packs: Vec<i64>,
    api: Option<Arc<dyn ContentApi>>,
    clock: Option<Arc<dyn Clock>>,
    backends: Option<(Box<dyn Backend>, Box<dyn Backend>)>,
}

impl Default for KidsQuizBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            storage_dir: None,
            fallback_dir: None,
            offline: false,
            locale: config::DEFAULT_LOCALE.to_string(),
            cache_ttl: config::CACHE_TTL,
            free_packs: config::FREE_PACK_IDS.to_vec(),
            api: None,
            clock: None,
            backends: None,
        }
    }
}

impl KidsQuizBuilder {
    /// Set the API base URL (e.g. `https://example.org/api/v1`).
    ///
    /// Defaults to `$KIDS_QUIZ_API_URL`, or `http://kids.localhost:8765/api/v1`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory of the primary storage backend.
    ///
    /// Defaults to the platform data directory (e.g.
    /// `~/.local/share/kids-quiz` on Linux).
    pub fn storage_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory of the fallback storage backend.
    ///
    /// Defaults to the platform cache directory.
    pub fn fallback_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.fallback_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline the server is never contacted and the catalog is always
    /// the built-in sample. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Locale used to resolve names, question texts and audio. Defaults to `ru`.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// How long a fetched catalog is served without re-fetching.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Pack ids that are playable without a purchase.
    pub fn free_packs(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.free_packs = ids.into_iter().collect();
        self
    }

    /// Use a custom [`ContentApi`] instead of HTTP. Overrides `base_url`.
    pub fn api(mut self, api: Arc<dyn ContentApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use custom storage backends. Overrides `storage_dir`/`fallback_dir`.
    pub fn backends(mut self, primary: Box<dyn Backend>, fallback: Box<dyn Backend>) -> Self {
        self.backends = Some((primary, fallback));
        self
    }

    /// Build the engine. Nothing is fetched until the first request.
    pub fn build(self) -> Result<KidsQuiz> {
        if self.locale.trim().is_empty() {
            return Err(QuizError::InvalidArgument("locale must not be empty".into()));
        }

        let (api, endpoint): (Arc<dyn ContentApi>, String) = match self.api {
            Some(api) => (api, "custom".to_string()),
            None => {
                let http = HttpApi::new(
                    self.base_url.unwrap_or_else(config::api_base),
                    self.timeout,
                );
                let endpoint = http.base_url().to_string();
                (Arc::new(http), endpoint)
            }
        };

        let store = match self.backends {
            Some((primary, fallback)) => KeyValueStore::new(primary, fallback),
            None => KeyValueStore::with_dirs(
                self.storage_dir.unwrap_or_else(config::default_storage_dir),
                self.fallback_dir.unwrap_or_else(config::default_fallback_dir),
            ),
        };

        let options = CacheOptions {
            ttl: self.cache_ttl,
            offline: self.offline,
            locale: self.locale.clone(),
            free_packs: self.free_packs,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = ContentCache::new(api.clone(), clock, options);

        Ok(KidsQuiz {
            api,
            endpoint,
            cache: RefCell::new(cache),
            store,
            locale: self.locale,
        })
    }
}

// ---------------------------------------------------------------------------
// KidsQuiz
// ---------------------------------------------------------------------------

/// The main entry point.
///
/// Owns the content cache, the durable store and the content API handle.
/// Created via [`KidsQuiz::builder()`].
pub struct KidsQuiz {
    api: Arc<dyn ContentApi>,
    endpoint: String,
    cache: RefCell<ContentCache>,
    store: KeyValueStore,
    locale: String,
}

impl KidsQuiz {
    /// Create a new builder for configuring the engine.
    pub fn builder() -> KidsQuizBuilder {
        KidsQuizBuilder::default()
    }

    /// The raw catalog, from cache, server or sample data.
    pub fn catalog(&self) -> Catalog {
        self.cache.borrow_mut().get_catalog()
    }

    /// Menu entries with ownership applied from the purchase record.
    pub fn summaries(&self) -> Vec<PackSummary> {
        let owned = self.store.load_purchases();
        self.cache.borrow_mut().get_summaries(&owned)
    }

    /// The playable pack with the given slug.
    ///
    /// When the catalog has no such pack the matching built-in sample pack is
    /// returned instead, or `None` if the slug is not a sample slug either.
    /// A pack without a quiz is `None`.
    pub fn content_pack(&self, slug: &str) -> Option<ContentPack> {
        match self.lookup_pack(slug) {
            Ok(pack) => pack,
            Err(e) => {
                tracing::warn!(slug, error = %e, "pack lookup failed; trying sample packs");
                sample::content_pack(slug)
            }
        }
    }

    fn lookup_pack(&self, slug: &str) -> Result<Option<ContentPack>> {
        let catalog = self.catalog();
        let entry = transform::find_pack_by_slug_in(&catalog, slug, &self.locale)
            .ok_or_else(|| QuizError::NotFound(format!("content pack '{}'", slug)))?;
        Ok(transform::transform_in(entry, &self.locale))
    }

    /// A pack saved to storage after a verified purchase.
    pub fn stored_content_pack(&self, slug: &str) -> Option<ContentPack> {
        self.store.load_content_pack(slug)
    }

    /// Access ownership queries and the purchase flow.
    pub fn purchases(&self) -> PurchaseQuery<'_> {
        PurchaseQuery::new(self)
    }

    /// Load the pack for `slug` and start a session on it.
    ///
    /// Returns `None` when there is no such pack.
    pub fn start_session<H: SessionHost>(
        &self,
        slug: &str,
        host: H,
        config: SessionConfig,
    ) -> Option<QuizSession<H>> {
        let pack = self.content_pack(slug)?;
        Some(QuizSession::with_pack(host, config, pack))
    }

    /// Drop everything cached so the next request fetches again.
    pub fn refresh(&self) {
        self.cache.borrow_mut().invalidate();
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    pub fn api(&self) -> &dyn ContentApi {
        self.api.as_ref()
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Whether the cached catalog is still inside its TTL window.
    pub fn is_cache_fresh(&self) -> bool {
        self.cache.borrow().is_fresh()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for KidsQuiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.borrow();
        write!(
            f,
            "KidsQuiz(api={}, locale={}, storage=[{}], offline={})",
            self.endpoint,
            self.locale,
            self.store.describe(),
            cache.options().offline
        )
    }
}
