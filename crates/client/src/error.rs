//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for everything that can end a Mini-App
//! action. Front ends call [`AppError::report`] before showing the failure,
//! which captures unexpected errors to Sentry.

use thiserror::Error;

use crate::api::OrderError;
use crate::catalog::CatalogLoadError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-level error type for the Mini-App.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted state could not be read or written.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogLoadError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host runtime never became ready.
    #[error("Host runtime not ready after {attempts} attempts")]
    HostNotReady { attempts: u32 },

    /// A view failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        Self::Checkout(CheckoutError::Order(err))
    }
}

impl AppError {
    /// Whether the error is worth a Sentry event.
    ///
    /// Missing identity and rejected orders are expected outcomes the buyer
    /// has already been told about.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        !matches!(
            self,
            Self::Checkout(
                CheckoutError::MissingIdentity
                    | CheckoutError::Order(OrderError::Rejected { .. })
            )
        )
    }

    /// Log the error, capturing it to Sentry when reportable.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Mini-App error"
            );
        } else {
            tracing::warn!(error = %self, "Mini-App action failed");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a buyer id.
///
/// Call this once the buyer identity is resolved to associate errors with
/// the buyer.
pub fn set_sentry_user(buyer_id: &impl ToString, first_name: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(buyer_id.to_string()),
            username: first_name.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the buyer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::HostNotReady { attempts: 50 };
        assert_eq!(err.to_string(), "Host runtime not ready after 50 attempts");

        let err = AppError::from(CheckoutError::MissingIdentity);
        assert_eq!(err.to_string(), "Checkout error: buyer identity is unavailable");
    }

    #[test]
    fn test_app_error_reportable() {
        assert!(AppError::HostNotReady { attempts: 1 }.is_reportable());
        assert!(!AppError::from(CheckoutError::MissingIdentity).is_reportable());
        assert!(
            !AppError::from(OrderError::Rejected {
                status: 404,
                message: "Mijoz topilmadi".to_string(),
            })
            .is_reportable()
        );
        assert!(AppError::from(StoreError::Poisoned).is_reportable());
    }

    #[test]
    fn test_report_without_client_is_harmless() {
        AppError::HostNotReady { attempts: 3 }.report();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
    }
}
