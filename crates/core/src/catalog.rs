//! Product catalog.
//!
//! The catalog is an ordered, read-only list of [`Product`]s. It is parsed
//! leniently: a record that fails to decode is rejected on its own and the
//! rest of the catalog still loads. Only a payload that is not JSON at all,
//! or not an array, is an error, and callers treat that as an empty catalog.

use serde_json::Value;
use thiserror::Error;

use crate::types::{Price, Product, ProductId};

/// Errors for catalog payloads that cannot be used at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The payload is not valid JSON.
    #[error("catalog is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The payload is JSON but not an array of products.
    #[error("catalog must be a JSON array (got {0})")]
    NotAnArray(&'static str),
}

/// A product record that was skipped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position of the record in the payload.
    pub index: usize,
    /// Why the record was skipped.
    pub reason: String,
}

/// Result of a lenient catalog parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    pub catalog: Catalog,
    pub rejected: Vec<RejectedRecord>,
}

/// Resolves product ids to products.
pub trait ProductLookup {
    /// Find a product by id.
    fn product(&self, id: ProductId) -> Option<&Product>;
}

/// Category selection for the catalog grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Products whose category matches exactly.
    Only(String),
}

impl CategoryFilter {
    /// Parse a category selector; `all` (any case) selects everything.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    /// Whether a product passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == *category,
        }
    }

    /// The selector as shown to the user.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(category) => category,
        }
    }
}

/// An ordered list of products with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog, keeping the first product for any duplicated id.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut catalog = Self::default();
        for product in products {
            if catalog.product(product.id).is_none() {
                catalog.products.push(product);
            }
        }
        catalog
    }

    /// An empty catalog.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// The built-in menu used when the host page supplies no data.
    #[must_use]
    pub fn embedded() -> Self {
        const UNSPLASH: &str = "https://images.unsplash.com";
        let item = |id: i32, name: &str, price: u64, category: &str, photo: &str| {
            Product::new(
                ProductId::new(id),
                name,
                Price::new(price),
                category,
                format!("{UNSPLASH}/{photo}?w=600"),
            )
        };

        Self::new(vec![
            item(1, "Truffle Burger", 45000, "burger", "photo-1568901346375-23c9450c58cd"),
            item(2, "Pepperoni Pizza", 65000, "pizza", "photo-1513104890138-7c749659a591"),
            item(3, "Classic Cola", 12000, "drink", "photo-1622483767028-3f66f32aef97"),
            item(4, "Double Cheese Burger", 55000, "burger", "photo-1594212699903-ec8a3eca50f5"),
            item(5, "Margarita XL", 58000, "pizza", "photo-1604382354936-07c5d9983bd3"),
            item(6, "Fresh Fanta", 12000, "drink", "photo-1624552184280-9e9631bbeee9"),
        ])
    }

    /// Parse a JSON array of products.
    ///
    /// Records that fail to decode, or repeat an earlier id, are reported in
    /// [`ParsedCatalog::rejected`] instead of failing the whole parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not JSON or not an array.
    pub fn from_json(json: &str) -> Result<ParsedCatalog, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Array(records) = value else {
            return Err(CatalogError::NotAnArray(json_kind(&value)));
        };

        let mut parsed = ParsedCatalog::default();
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Product>(record) {
                Ok(product) if parsed.catalog.product(product.id).is_some() => {
                    parsed.rejected.push(RejectedRecord {
                        index,
                        reason: format!("duplicate product id {}", product.id),
                    });
                }
                Ok(product) => parsed.catalog.products.push(product),
                Err(e) => parsed.rejected.push(RejectedRecord {
                    index,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(parsed)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Find a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products passing `filter`, in catalog order.
    pub fn filter<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a Product> {
        self.products.iter().filter(move |p| filter.matches(p))
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }
}

impl ProductLookup for Catalog {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.find(id)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
