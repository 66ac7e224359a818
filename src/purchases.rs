//! Purchase ownership: initiation result handling, server verification and
//! the durable purchase record.

use crate::error::Result;
use crate::models::{PurchaseReceipt, PurchaseRecord, Verification};
use crate::KidsQuiz;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// PurchaseInitiator
// ---------------------------------------------------------------------------

/// The store integration that actually takes payment.
///
/// Only the shape of its result matters here; payment correctness is the
/// server's business during verification.
pub trait PurchaseInitiator {
    /// Prepare the store connection. Nothing to do by default.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn purchase(&mut self, product_id: &str) -> Result<PurchaseReceipt>;

    /// Product ids the store still knows as bought on this account.
    ///
    /// Stores without restore support (web checkout) report none.
    fn restore(&mut self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Stand-in store that approves every purchase after a short delay.
#[derive(Debug, Clone)]
pub struct MockInitiator {
    delay: Duration,
    prefix: String,
    restorable: Vec<String>,
}

impl MockInitiator {
    /// Behaves like the app-store flow: 2 s, `mock_` transaction ids, and
    /// two packs to restore.
    pub fn native() -> Self {
        Self {
            delay: Duration::from_millis(2000),
            prefix: "mock_".to_string(),
            restorable: vec!["emotions".to_string(), "objects".to_string()],
        }
    }

    /// Behaves like the web checkout: 1.5 s, `web_mock_` transaction ids.
    pub fn web() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            prefix: "web_mock_".to_string(),
            restorable: Vec::new(),
        }
    }

    /// No delay at all.
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            prefix: "mock_".to_string(),
            restorable: Vec::new(),
        }
    }

    /// Replace the product ids reported by [`PurchaseInitiator::restore`].
    pub fn with_restorable<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restorable = ids.into_iter().map(Into::into).collect();
        self
    }
}

impl PurchaseInitiator for MockInitiator {
    fn initialize(&mut self) -> Result<()> {
        tracing::debug!(prefix = %self.prefix, "mock store initialized");
        Ok(())
    }

    fn purchase(&mut self, product_id: &str) -> Result<PurchaseReceipt> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        tracing::info!(product = product_id, "mock purchase completed");
        Ok(PurchaseReceipt::new(
            format!("{}{}", self.prefix, millis),
            product_id,
        ))
    }

    fn restore(&mut self) -> Result<Vec<String>> {
        tracing::info!(count = self.restorable.len(), "mock purchases restored");
        Ok(self.restorable.clone())
    }
}

// ---------------------------------------------------------------------------
// PurchaseQuery
// ---------------------------------------------------------------------------

/// Result of a full purchase attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// The product is free or already in the purchase record; nothing was
    /// charged.
    AlreadyOwned,
    /// The store reported `success: false`.
    Declined(PurchaseReceipt),
    /// The server confirmed the purchase and ownership was recorded.
    Verified(Verification),
    /// The server answered but did not confirm the purchase.
    Rejected(Verification),
}

/// Ownership queries and purchase flow, borrowing a [`KidsQuiz`].
pub struct PurchaseQuery<'a> {
    quiz: &'a KidsQuiz,
}

impl<'a> PurchaseQuery<'a> {
    pub fn new(quiz: &'a KidsQuiz) -> Self {
        Self { quiz }
    }

    /// Every product id recorded as owned.
    pub fn owned(&self) -> PurchaseRecord {
        self.quiz.store().load_purchases()
    }

    /// Whether `product_id` is in the purchase record. Free packs are not
    /// recorded; see [`PurchaseQuery::is_free`].
    pub fn is_purchased(&self, product_id: &str) -> bool {
        self.quiz.store().is_purchased(product_id)
    }

    /// Whether the pack with slug `product_id` is free to play.
    pub fn is_free(&self, product_id: &str) -> bool {
        self.quiz
            .summaries()
            .iter()
            .any(|summary| summary.slug == product_id && summary.is_free)
    }

    /// Verify `receipt` with the server and, only if it confirms, record
    /// ownership and save the pack's content for later.
    ///
    /// Transport errors and non-success statuses are returned as errors; in
    /// that case nothing is recorded.
    pub fn verify(&self, receipt: &PurchaseReceipt) -> Result<Verification> {
        let verification = self.quiz.api().verify_purchase(receipt)?;
        if !verification.success {
            tracing::warn!(product = %receipt.product_id, "purchase was not verified");
            return Ok(verification);
        }

        let product_id = receipt.product_id.as_str();
        self.quiz.store().add_purchase(product_id)?;
        tracing::info!(product = product_id, "purchase recorded");

        if let Some(pack) = self.quiz.content_pack(product_id) {
            if let Err(e) = self.quiz.store().save_content_pack(product_id, &pack) {
                tracing::warn!(product = product_id, error = %e, "could not save purchased pack");
            }
        }
        // Menu summaries carry `is_purchased`.
        self.quiz.refresh();
        Ok(verification)
    }

    /// Buy `product_id` through `initiator` and verify the result.
    pub fn purchase<I: PurchaseInitiator + ?Sized>(
        &self,
        initiator: &mut I,
        product_id: &str,
    ) -> Result<PurchaseOutcome> {
        if self.is_purchased(product_id) || self.is_free(product_id) {
            return Ok(PurchaseOutcome::AlreadyOwned);
        }

        let receipt = initiator.purchase(product_id)?;
        if !receipt.success {
            tracing::info!(product = product_id, "purchase declined by store");
            return Ok(PurchaseOutcome::Declined(receipt));
        }

        let verification = self.verify(&receipt)?;
        if verification.success {
            Ok(PurchaseOutcome::Verified(verification))
        } else {
            Ok(PurchaseOutcome::Rejected(verification))
        }
    }

    /// Ask `initiator` for past purchases and record each of them.
    ///
    /// Returns the ids in the order the store reported them. Ids already in
    /// the record are not added twice.
    pub fn restore<I: PurchaseInitiator + ?Sized>(&self, initiator: &mut I) -> Result<Vec<String>> {
        let restored = initiator.restore()?;
        for product_id in &restored {
            self.quiz.store().add_purchase(product_id)?;
        }
        tracing::info!(count = restored.len(), "purchases restored");
        self.quiz.refresh();
        Ok(restored)
    }
}
