//! Catalog loading.
//!
//! The menu comes from one of three places: the menu built into the binary,
//! a JSON file on disk, or the backend's catalog page. The backend embeds the
//! product list in the page as `<script id="products-data">[...]</script>`;
//! raw JSON responses are accepted too.
//!
//! Malformed content never fails the session. It degrades to an empty (or
//! partial) catalog and is logged. Transport failures are surfaced.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use food_miniapp_core::{BuyerId, Catalog};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::BackendClient;

static PRODUCTS_DATA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*\bid\s*=\s*["']products-data["'][^>]*>(.*?)</script>"#).ok()
});

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// The built-in menu.
    #[default]
    Embedded,
    /// A JSON file on disk.
    File(PathBuf),
    /// The backend's catalog page for the current buyer.
    Remote,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Error returned when a catalog source string is not recognized.
#[derive(Debug, Clone, Error)]
#[error("unknown catalog source {0:?} (expected embedded, remote or file:<path>)")]
pub struct UnknownCatalogSource(String);

impl FromStr for CatalogSource {
    type Err = UnknownCatalogSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("file:") {
            if path.is_empty() {
                return Err(UnknownCatalogSource(s.to_string()));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }
        match s.to_ascii_lowercase().as_str() {
            "embedded" => Ok(Self::Embedded),
            "remote" => Ok(Self::Remote),
            _ => Err(UnknownCatalogSource(s.to_string())),
        }
    }
}

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog page could not be fetched.
    #[error("catalog request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("catalog page returned HTTP {0}")]
    Status(u16),

    /// The remote catalog is per-buyer and no buyer is known.
    #[error("remote catalog needs a buyer id")]
    MissingBuyer,

    /// The catalog page URL could not be built.
    #[error("invalid catalog URL: {0}")]
    Url(String),
}

/// Load the catalog from `source`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the page cannot be
/// fetched. Unparsable content is not an error.
#[instrument(skip(backend))]
pub async fn load(
    source: &CatalogSource,
    backend: &BackendClient,
    buyer: Option<BuyerId>,
) -> Result<Catalog, CatalogLoadError> {
    let catalog = match source {
        CatalogSource::Embedded => Catalog::embedded(),
        CatalogSource::File(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogLoadError::Io {
                    path: path.clone(),
                    source,
                })?;
            parse_catalog_text(&text)
        }
        CatalogSource::Remote => {
            let buyer = buyer.ok_or(CatalogLoadError::MissingBuyer)?;
            let page = backend.fetch_catalog_page(buyer).await?;
            parse_catalog_text(&page)
        }
    };

    info!(%source, products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Parse a catalog page or raw JSON document.
///
/// Individual malformed records are skipped; a document that is not a
/// product array at all yields an empty catalog.
#[must_use]
pub fn parse_catalog_text(text: &str) -> Catalog {
    let json = extract_products_blob(text).unwrap_or(text);

    match Catalog::from_json(json) {
        Ok(parsed) => {
            for rejected in &parsed.rejected {
                warn!(
                    index = rejected.index,
                    reason = %rejected.reason,
                    "Skipped malformed product record"
                );
            }
            parsed.catalog
        }
        Err(e) => {
            warn!(error = %e, "Catalog data is malformed, using empty catalog");
            Catalog::empty()
        }
    }
}

/// The content of the `products-data` script element, if present.
fn extract_products_blob(page: &str) -> Option<&str> {
    let regex = PRODUCTS_DATA.as_ref()?;
    let blob = regex.captures(page)?.get(1)?.as_str().trim();
    debug!(bytes = blob.len(), "Found products-data element");
    Some(blob)
}
