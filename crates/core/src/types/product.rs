//! Product records as supplied by the host page.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Image shown when the backend has no picture for a product.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150?text=Rasm+yoq";

/// Category assigned when the backend omits one.
const FALLBACK_CATEGORY: &str = "boshqa";

/// A menu item.
///
/// Serialized with camelCase keys. Deserialization also accepts the short
/// keys the host page emits (`cat`, `img`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(alias = "cat", default = "fallback_category")]
    pub category: String,
    #[serde(alias = "img", default = "placeholder_image")]
    pub image_url: String,
}

impl Product {
    /// Create a product.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Price,
        category: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            category: category.into(),
            image_url: image_url.into(),
        }
    }
}

fn fallback_category() -> String {
    FALLBACK_CATEGORY.to_string()
}

fn placeholder_image() -> String {
    PLACEHOLDER_IMAGE_URL.to_string()
}
