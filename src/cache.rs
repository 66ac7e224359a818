//! Time-bounded in-memory cache of the raw catalog and the menu summaries.
//!
//! The catalog is re-fetched at most once per TTL window. A failed fetch
//! fills the cache with the built-in sample catalog for the whole window, so
//! callers always get a catalog back. Summaries are derived once from the
//! catalog and then kept until [`ContentCache::invalidate`].

use crate::api::ContentApi;
use crate::config;
use crate::models::{Catalog, CatalogEntry, PackSummary, PurchaseRecord};
use crate::sample;
use crate::transform::entry_slug;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ---------------------------------------------------------------------------
// CatalogFetch
// ---------------------------------------------------------------------------

/// Where a catalog handed out by the cache came from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogFetch {
    /// Fetched from the server by this call.
    Fresh(Catalog),
    /// Served from memory inside the TTL window.
    Cached(Catalog),
    /// The server was unreachable (or offline mode is on); sample data.
    Sample(Catalog),
}

impl CatalogFetch {
    pub fn catalog(&self) -> &Catalog {
        match self {
            CatalogFetch::Fresh(c) | CatalogFetch::Cached(c) | CatalogFetch::Sample(c) => c,
        }
    }

    pub fn into_catalog(self) -> Catalog {
        match self {
            CatalogFetch::Fresh(c) | CatalogFetch::Cached(c) | CatalogFetch::Sample(c) => c,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CatalogFetch::Fresh(_))
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, CatalogFetch::Cached(_))
    }

    pub fn is_sample(&self) -> bool {
        matches!(self, CatalogFetch::Sample(_))
    }
}

// ---------------------------------------------------------------------------
// ContentCache
// ---------------------------------------------------------------------------

/// Tuning knobs for a [`ContentCache`].
#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub ttl: Duration,
    /// Never contact the server; every fetch resolves to sample data.
    pub offline: bool,
    pub locale: String,
    /// Pack ids that are playable without a purchase.
    pub free_packs: Vec<i64>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: config::CACHE_TTL,
            offline: false,
            locale: config::DEFAULT_LOCALE.to_string(),
            free_packs: config::FREE_PACK_IDS.to_vec(),
        }
    }
}

/// In-memory catalog cache in front of a [`ContentApi`].
///
/// Not single-flight: two callers racing on a cold cache may each trigger a
/// fetch.
pub struct ContentCache {
    api: Arc<dyn ContentApi>,
    clock: Arc<dyn Clock>,
    options: CacheOptions,
    catalog: Option<Catalog>,
    summaries: Option<Vec<PackSummary>>,
    last_fetch: Option<Instant>,
}

impl ContentCache {
    pub fn new(api: Arc<dyn ContentApi>, clock: Arc<dyn Clock>, options: CacheOptions) -> Self {
        Self {
            api,
            clock,
            options,
            catalog: None,
            summaries: None,
            last_fetch: None,
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Time of the last fetch attempt that filled the cache.
    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }

    /// Whether a cached catalog exists and is inside its TTL window.
    pub fn is_fresh(&self) -> bool {
        match (&self.catalog, self.last_fetch) {
            (Some(_), Some(last)) => {
                self.clock.now().saturating_duration_since(last) < self.options.ttl
            }
            _ => false,
        }
    }

    /// Return the catalog, tagged with where it came from.
    ///
    /// Serves the cached catalog while it is fresh. Otherwise makes exactly
    /// one fetch attempt; on failure the sample catalog is stored in its
    /// place and the timestamp is still advanced.
    pub fn load_catalog(&mut self) -> CatalogFetch {
        if self.is_fresh() {
            if let Some(catalog) = &self.catalog {
                tracing::debug!(packs = catalog.len(), "serving cached catalog");
                return CatalogFetch::Cached(catalog.clone());
            }
        }

        let now = self.clock.now();
        let fetch = if self.options.offline {
            tracing::debug!("offline mode; using sample catalog");
            CatalogFetch::Sample(sample::catalog())
        } else {
            match self.api.fetch_catalog() {
                Ok(catalog) => CatalogFetch::Fresh(catalog),
                Err(e) => {
                    tracing::warn!(error = %e, "catalog fetch failed; falling back to sample data");
                    CatalogFetch::Sample(sample::catalog())
                }
            }
        };

        self.catalog = Some(fetch.catalog().clone());
        self.last_fetch = Some(now);
        fetch
    }

    /// Return the catalog. Never fails: network errors resolve to sample data.
    pub fn get_catalog(&mut self) -> Catalog {
        self.load_catalog().into_catalog()
    }

    /// Return the menu summaries.
    ///
    /// Computed from one [`get_catalog`](Self::get_catalog) call on first use
    /// and then kept until [`invalidate`](Self::invalidate), even after the
    /// catalog itself goes stale.
    pub fn get_summaries(&mut self, owned: &PurchaseRecord) -> Vec<PackSummary> {
        if let Some(summaries) = &self.summaries {
            return summaries.clone();
        }

        let catalog = self.get_catalog();
        let summaries: Vec<PackSummary> = catalog
            .iter()
            .map(|entry| {
                summarize(entry, &self.options.locale, &self.options.free_packs, owned)
            })
            .collect();
        self.summaries = Some(summaries.clone());
        summaries
    }

    /// Drop the cached catalog, summaries and fetch timestamp.
    pub fn invalidate(&mut self) {
        self.catalog = None;
        self.summaries = None;
        self.last_fetch = None;
    }
}

/// Build the menu entry for one catalog entry.
pub fn summarize(
    entry: &CatalogEntry,
    locale: &str,
    free_packs: &[i64],
    owned: &PurchaseRecord,
) -> PackSummary {
    let name = entry.name(locale).to_string();
    let slug = entry_slug(entry, locale);
    let is_free = free_packs.contains(&entry.id);
    PackSummary {
        id: entry.id,
        is_purchased: is_free || owned.contains(&slug),
        slug,
        description: format!("Викторина: {}", name),
        name,
        image: entry.image.clone(),
        questions_count: entry.question_count(),
        is_free,
    }
}
