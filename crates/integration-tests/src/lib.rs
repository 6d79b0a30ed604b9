//! Integration tests for the food-ordering Mini-App.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p food-miniapp-integration-tests
//! ```
//!
//! Every test runs against a `wiremock` backend and a temporary state
//! directory; nothing needs to be running.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Catalog page, anti-forgery cookie and order submission
//! - `persistence` - Cart and buyer id surviving a restart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;

use food_miniapp_client::{
    BackendClient, ClientConfig, Haptic, HostRuntime, Notice, Page, Readiness,
};
use food_miniapp_core::{BuyerId, BuyerIdentity};
use wiremock::MockServer;

/// Catalog page served by the mock backend.
pub const CATALOG_PAGE: &str = r#"<!doctype html>
<html>
<body>
  <div id="food-grid"></div>
  <script id="products-data" type="application/json">
    [
      {"id": 1, "name": "Truffle Burger", "price": 45000.0, "category": "burger", "imageUrl": "/media/1.jpg"},
      {"id": 2, "name": "Classic Cola", "price": 12000.0, "category": "drink", "imageUrl": "/media/2.jpg"},
      {"id": 3, "name": "Broken", "price": "free"}
    ]
  </script>
</body>
</html>"#;

/// Host runtime that records everything the session asks of it.
#[derive(Debug, Default)]
pub struct RecordingHost {
    identity: Option<BuyerIdentity>,
    pending_answers: Mutex<u32>,
    notices: Mutex<Vec<Notice>>,
    haptics: Mutex<Vec<Haptic>>,
    pages: Mutex<Vec<Page>>,
}

impl RecordingHost {
    /// A ready host vouching for `buyer`.
    #[must_use]
    pub fn for_buyer(buyer: i64) -> Self {
        Self {
            identity: BuyerId::new(buyer).ok().map(|id| BuyerIdentity {
                id,
                first_name: Some("Aziz".to_string()),
            }),
            ..Self::default()
        }
    }

    /// A ready host without identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Answer `pending` readiness checks with `Pending` before becoming ready.
    #[must_use]
    pub fn pending_for(self, pending: u32) -> Self {
        Self {
            pending_answers: Mutex::new(pending),
            ..self
        }
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn haptics(&self) -> Vec<Haptic> {
        self.haptics.lock().map(|h| h.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn pages(&self) -> Vec<Page> {
        self.pages.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl HostRuntime for RecordingHost {
    async fn ready(&self) -> Readiness {
        let Ok(mut pending) = self.pending_answers.lock() else {
            return Readiness::Pending;
        };
        if *pending == 0 {
            Readiness::Ready
        } else {
            *pending -= 1;
            Readiness::Pending
        }
    }

    fn identity(&self) -> Option<BuyerIdentity> {
        self.identity.clone()
    }

    fn notify(&self, notice: &Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice.clone());
        }
    }

    fn haptic(&self, feedback: Haptic) {
        if let Ok(mut haptics) = self.haptics.lock() {
            haptics.push(feedback);
        }
    }

    fn navigate(&self, page: Page) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.push(page);
        }
    }
}

/// Backend client pointed at `server`, with the given config tweaks.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid base URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn backend_for(server: &MockServer, tweak: impl FnOnce(&mut ClientConfig)) -> BackendClient {
    let mut config = ClientConfig::for_base_url(&server.uri()).unwrap();
    tweak(&mut config);
    BackendClient::new(config).unwrap()
}
