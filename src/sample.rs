//! Built-in sample catalog served whenever the content API is unreachable.

use crate::models::{Catalog, ContentPack};
use crate::transform::{find_pack_by_slug, transform};

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");

/// The sample catalog: "Животные" (id 5, three questions) and "Эмоции"
/// (id 6, one question).
pub fn catalog() -> Catalog {
    match serde_json::from_str(SAMPLE_CATALOG) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, "built-in sample catalog is malformed");
            Vec::new()
        }
    }
}

/// The transformed sample pack for `slug`, if one of the sample entries has
/// that slug.
pub fn content_pack(slug: &str) -> Option<ContentPack> {
    let catalog = catalog();
    find_pack_by_slug(&catalog, slug).and_then(transform)
}
