use serde::{Deserialize, Serialize};

/// What the purchase-initiation collaborator hands back. Forwarded verbatim
/// to the verification endpoint, extra fields included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub success: bool,
    #[serde(default)]
    pub transaction_id: String,
    pub product_id: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PurchaseReceipt {
    pub fn new(transaction_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            success: true,
            transaction_id: transaction_id.into(),
            product_id: product_id.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Response of `POST /purchases/verify/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// PurchaseRecord - owned product ids, insertion ordered, no duplicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseRecord(Vec<String>);

impl PurchaseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product id. Returns `false` if it was already present.
    pub fn insert(&mut self, product_id: &str) -> bool {
        if self.contains(product_id) {
            return false;
        }
        self.0.push(product_id.to_string());
        true
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.0.iter().any(|p| p == product_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PurchaseRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut record = PurchaseRecord::new();
        for id in iter {
            record.insert(&id.into());
        }
        record
    }
}
