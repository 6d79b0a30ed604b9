//! Mini-App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Every value has a default, so the client runs offline against the
//! embedded menu without any configuration.
//!
//! - `MINIAPP_BASE_URL` - Backend origin (default: `http://127.0.0.1:8000`)
//! - `MINIAPP_ORDER_PATH` - Order endpoint path (default: `/order/create-order/`)
//! - `MINIAPP_CATALOG_PATH` - Catalog page path, `{buyer_id}` is substituted (default: `/{buyer_id}/`)
//! - `MINIAPP_CATALOG_SOURCE` - `embedded`, `remote` or `file:<path>` (default: `embedded`)
//! - `MINIAPP_STATE_DIR` - Directory for persisted state (default: `.miniapp`)
//! - `MINIAPP_CSRF_COOKIE` - Anti-forgery cookie name (default: `csrftoken`)
//! - `MINIAPP_CSRF_HEADER` - Anti-forgery header name (default: `X-CSRFToken`)
//! - `MINIAPP_CSRF_TOKEN` - Explicit anti-forgery token, overrides the cookie
//! - `MINIAPP_BUYER_ID` - Telegram id the terminal host vouches for
//! - `MINIAPP_READY_ATTEMPTS` - Host readiness checks (default: 50)
//! - `MINIAPP_READY_INTERVAL_MS` - Delay between readiness checks (default: 100)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use food_miniapp_core::BuyerId;
use reqwest::header::HeaderName;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::bootstrap::ReadyPolicy;
use crate::catalog::CatalogSource;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_ORDER_PATH: &str = "/order/create-order/";
const DEFAULT_CATALOG_PATH: &str = "/{buyer_id}/";
const BUYER_PLACEHOLDER: &str = "{buyer_id}";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Mini-App client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin
    pub base_url: Url,
    /// Absolute order endpoint
    pub order_url: Url,
    /// Catalog page path template
    pub catalog_path: String,
    /// Where the menu comes from
    pub catalog_source: CatalogSource,
    /// Directory for the persisted store
    pub state_dir: PathBuf,
    /// Anti-forgery settings
    pub csrf: CsrfConfig,
    /// Buyer id supplied on behalf of the host
    pub buyer_id: Option<BuyerId>,
    /// Host readiness policy
    pub ready: ReadyPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Anti-forgery header configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CsrfConfig {
    /// Cookie the backend sets the token in
    pub cookie_name: String,
    /// Header the token is echoed in
    pub header_name: HeaderName,
    /// Explicit token, used instead of the cookie when set
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for CsrfConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfConfig")
            .field("cookie_name", &self.cookie_name)
            .field("header_name", &self.header_name)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            header_name: HeaderName::from_static("x-csrftoken"),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = EnvLookup(lookup);

        let base_url = parse_url(
            "MINIAPP_BASE_URL",
            &env.or_default("MINIAPP_BASE_URL", DEFAULT_BASE_URL),
        )?;
        let order_path = env.or_default("MINIAPP_ORDER_PATH", DEFAULT_ORDER_PATH);
        let order_url = base_url
            .join(&order_path)
            .map_err(|e| invalid("MINIAPP_ORDER_PATH", e))?;

        let catalog_source = env
            .or_default("MINIAPP_CATALOG_SOURCE", "embedded")
            .parse::<CatalogSource>()
            .map_err(|e| invalid("MINIAPP_CATALOG_SOURCE", e))?;

        let csrf = CsrfConfig {
            cookie_name: env.or_default("MINIAPP_CSRF_COOKIE", "csrftoken"),
            header_name: env
                .or_default("MINIAPP_CSRF_HEADER", "X-CSRFToken")
                .parse::<HeaderName>()
                .map_err(|e| invalid("MINIAPP_CSRF_HEADER", e))?,
            token: env.optional("MINIAPP_CSRF_TOKEN").map(SecretString::from),
        };

        let buyer_id = env
            .optional("MINIAPP_BUYER_ID")
            .map(|raw| BuyerId::parse(&raw))
            .transpose()
            .map_err(|e| invalid("MINIAPP_BUYER_ID", e))?;

        let defaults = ReadyPolicy::default();
        let attempts = env
            .optional("MINIAPP_READY_ATTEMPTS")
            .map_or(Ok(defaults.attempts), |raw| raw.parse::<u32>())
            .map_err(|e| invalid("MINIAPP_READY_ATTEMPTS", e))?;
        let interval = env
            .optional("MINIAPP_READY_INTERVAL_MS")
            .map(|raw| raw.parse::<u64>().map(Duration::from_millis))
            .transpose()
            .map_err(|e| invalid("MINIAPP_READY_INTERVAL_MS", e))?
            .unwrap_or(defaults.interval);

        Ok(Self {
            base_url,
            order_url,
            catalog_path: env.or_default("MINIAPP_CATALOG_PATH", DEFAULT_CATALOG_PATH),
            catalog_source,
            state_dir: PathBuf::from(env.or_default("MINIAPP_STATE_DIR", ".miniapp")),
            csrf,
            buyer_id,
            ready: ReadyPolicy { attempts, interval },
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Defaults pointed at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.to_string();
        Self::from_vars(move |key| (key == "MINIAPP_BASE_URL").then(|| base_url.clone()))
    }

    /// The catalog page URL for `buyer`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the substituted path does not form a URL.
    pub fn catalog_url(&self, buyer: BuyerId) -> Result<Url, ConfigError> {
        let path = self
            .catalog_path
            .replace(BUYER_PLACEHOLDER, &buyer.to_string());
        self.base_url
            .join(&path)
            .map_err(|e| invalid("MINIAPP_CATALOG_PATH", e))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct EnvLookup<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvLookup<F> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn invalid(key: &str, error: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), error.to_string())
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(key, e))?;
    if url.cannot_be_a_base() {
        return Err(invalid(key, "URL cannot be used as a base"));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(
            config.order_url.as_str(),
            "http://127.0.0.1:8000/order/create-order/"
        );
        assert_eq!(config.catalog_source, CatalogSource::Embedded);
        assert_eq!(config.state_dir, PathBuf::from(".miniapp"));
        assert_eq!(config.csrf.cookie_name, "csrftoken");
        assert_eq!(config.csrf.header_name.as_str(), "x-csrftoken");
        assert!(config.csrf.token.is_none());
        assert!(config.buyer_id.is_none());
        assert_eq!(config.ready, ReadyPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("MINIAPP_BASE_URL", "https://food.example.uz"),
            ("MINIAPP_ORDER_PATH", "/api/orders/"),
            ("MINIAPP_CATALOG_SOURCE", "file:menu.json"),
            ("MINIAPP_CSRF_TOKEN", "abc123"),
            ("MINIAPP_BUYER_ID", "777"),
            ("MINIAPP_READY_ATTEMPTS", "3"),
            ("MINIAPP_READY_INTERVAL_MS", "5"),
        ])
        .unwrap();

        assert_eq!(config.order_url.as_str(), "https://food.example.uz/api/orders/");
        assert_eq!(
            config.catalog_source,
            CatalogSource::File(PathBuf::from("menu.json"))
        );
        assert_eq!(
            config.csrf.token.as_ref().unwrap().expose_secret(),
            "abc123"
        );
        assert_eq!(config.buyer_id.unwrap().as_i64(), 777);
        assert_eq!(config.ready.attempts, 3);
        assert_eq!(config.ready.interval, Duration::from_millis(5));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_with(&[("MINIAPP_BUYER_ID", "  "), ("MINIAPP_STATE_DIR", "")]).unwrap();
        assert!(config.buyer_id.is_none());
        assert_eq!(config.state_dir, PathBuf::from(".miniapp"));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("MINIAPP_BASE_URL", "not a url"),
            ("MINIAPP_BUYER_ID", "-5"),
            ("MINIAPP_READY_ATTEMPTS", "many"),
            ("MINIAPP_CSRF_HEADER", "bad header"),
            ("MINIAPP_CATALOG_SOURCE", "ftp"),
        ] {
            let err = config_with(&[(key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn test_catalog_url_substitutes_buyer() {
        let config = ClientConfig::for_base_url("http://localhost:8000").unwrap();
        let url = config.catalog_url(BuyerId::new(42).unwrap()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/42/");
    }

    #[test]
    fn test_csrf_config_debug_redacts_token() {
        let csrf = CsrfConfig {
            token: Some(SecretString::from("super_secret_csrf_token")),
            ..CsrfConfig::default()
        };

        let debug_output = format!("{csrf:?}");
        assert!(debug_output.contains("csrftoken"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_csrf_token"));
    }
}
