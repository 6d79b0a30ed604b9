//! Backend client implementation.

use std::sync::Arc;

use food_miniapp_core::{BuyerId, Order, OrderId, OrderReceipt};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{Span, debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::OrderError;
use crate::catalog::CatalogLoadError;
use crate::checkout::OrderGateway;
use crate::config::ClientConfig;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest backend message kept in a [`OrderError::Rejected`].
const MAX_MESSAGE_CHARS: usize = 200;

/// Body the order endpoint answers with.
#[derive(Debug, Default, Deserialize)]
struct OrderAck {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    message: Option<String>,
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the ordering backend.
///
/// Cheap to clone; clones share the connection pool and cookie jar.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    jar: Arc<Jar>,
    config: ClientConfig,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("order_url", &self.inner.config.order_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(concat!("food-miniapp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                jar,
                config,
            }),
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Fetch the catalog page for `buyer`.
    ///
    /// Any cookies the page sets, including the anti-forgery token, land in
    /// the shared jar.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self), fields(request_id))]
    pub async fn fetch_catalog_page(&self, buyer: BuyerId) -> Result<String, CatalogLoadError> {
        let url = self
            .inner
            .config
            .catalog_url(buyer)
            .map_err(|e| CatalogLoadError::Url(e.to_string()))?;
        let request_id = new_request_id();

        let response = self
            .inner
            .client
            .get(url.clone())
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Catalog page returned non-success status");
            return Err(CatalogLoadError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "Fetched catalog page");
        Ok(body)
    }

    /// Submit `order` to the order endpoint.
    ///
    /// Issues exactly one request. There is no retry and no idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Transport`] if the request does not complete and
    /// [`OrderError::Rejected`] for any non-2xx response.
    #[instrument(
        skip(self, order),
        fields(
            buyer_id = %order.buyer_id,
            items = order.line_items.len(),
            total = %order.total_price,
            request_id,
        )
    )]
    pub async fn submit_order(&self, order: &Order) -> Result<OrderReceipt, OrderError> {
        let url = &self.inner.config.order_url;
        let request_id = new_request_id();

        let mut request = self
            .inner
            .client
            .post(url.clone())
            .header(REQUEST_ID_HEADER, &request_id)
            .json(order);

        match self.csrf_token(url) {
            Some(token) => {
                request = request.header(self.inner.config.csrf.header_name.clone(), token);
            }
            None => warn!("No anti-forgery token available, sending order without it"),
        }

        let response = request.send().await?;
        let status = response.status();

        // The status alone decides the outcome; the body is only read for details.
        let body = response.text().await.unwrap_or_else(|e| {
            warn!(error = %e, status = status.as_u16(), "Failed to read order response body");
            String::new()
        });
        let ack: OrderAck = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() {
            let message = ack.message.or(ack.status).unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.chars().take(MAX_MESSAGE_CHARS).collect()
                }
            });
            warn!(status = status.as_u16(), %message, "Order rejected");
            return Err(OrderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(order_id = ?ack.order_id, "Order accepted");
        Ok(OrderReceipt::for_order(order, ack.order_id))
    }

    /// The anti-forgery token to send to `url`.
    ///
    /// The configured token wins; otherwise the cookie jar is consulted.
    fn csrf_token(&self, url: &Url) -> Option<HeaderValue> {
        let csrf = &self.inner.config.csrf;
        if let Some(token) = &csrf.token {
            return HeaderValue::from_str(token.expose_secret()).ok();
        }

        let cookies = self.inner.jar.cookies(url)?;
        let cookies = cookies.to_str().ok()?;
        let raw = cookie_value(cookies, &csrf.cookie_name)?;
        let decoded = urlencoding::decode(raw).ok()?;
        HeaderValue::from_str(&decoded).ok()
    }
}

impl OrderGateway for BackendClient {
    async fn submit(&self, order: &Order) -> Result<OrderReceipt, OrderError> {
        self.submit_order(order).await
    }
}

fn new_request_id() -> String {
    let request_id = Uuid::new_v4().to_string();
    Span::current().record("request_id", request_id.as_str());
    request_id
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`).
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
