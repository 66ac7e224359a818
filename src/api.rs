//! Request/response access to the quiz content server.
//!
//! The server is an opaque data source with two endpoints: the catalog
//! (`GET {base}/quiz/content/`) and purchase verification
//! (`POST {base}/purchases/verify/`).

use crate::config;
use crate::error::{QuizError, Result};
use crate::models::{Catalog, PurchaseReceipt, Verification};
use reqwest::blocking::Client;
use std::sync::Mutex;
use std::time::Duration;

/// The server contract consumed by the cache and the purchase flow.
///
/// Implemented by [`HttpApi`]; tests substitute their own fakes.
pub trait ContentApi: Send + Sync {
    /// Fetch the full raw catalog.
    fn fetch_catalog(&self) -> Result<Catalog>;

    /// Ask the server to verify a purchase receipt.
    ///
    /// A non-success status is reported as [`QuizError::Verification`].
    fn verify_purchase(&self, receipt: &PurchaseReceipt) -> Result<Verification>;
}

// ---------------------------------------------------------------------------
// HttpApi
// ---------------------------------------------------------------------------

/// [`ContentApi`] over HTTP with a blocking `reqwest` client.
pub struct HttpApi {
    base_url: String,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl HttpApi {
    /// Create an API handle for `base_url` (e.g. `http://host/api/v1`).
    ///
    /// No connection is made until the first request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client: Mutex::new(None),
        }
    }

    /// Handle for the configured default base URL.
    pub fn from_env() -> Self {
        Self::new(config::api_base(), config::DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lazy HTTP client, created on first use.
    fn client(&self) -> Result<Client> {
        let mut slot = self.client.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Close the HTTP client, if open. The next request opens a new one.
    pub fn close(&self) {
        let mut slot = self.client.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl ContentApi for HttpApi {
    fn fetch_catalog(&self) -> Result<Catalog> {
        let url = self.endpoint(config::CATALOG_PATH);
        tracing::info!(%url, "fetching quiz catalog");
        let client = self.client()?;
        let resp = client.get(&url).send()?.error_for_status()?;
        let catalog: Catalog = resp.json()?;
        tracing::debug!(packs = catalog.len(), "catalog received");
        Ok(catalog)
    }

    fn verify_purchase(&self, receipt: &PurchaseReceipt) -> Result<Verification> {
        let url = self.endpoint(config::VERIFY_PATH);
        tracing::info!(%url, product = %receipt.product_id, "verifying purchase");
        let client = self.client()?;
        let resp = client.post(&url).json(receipt).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(QuizError::Verification(format!(
                "server responded with {} for product {}",
                status, receipt.product_id
            )));
        }
        Ok(resp.json()?)
    }
}
