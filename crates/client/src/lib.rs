//! Food Mini-App client library.
//!
//! Everything a front end needs to run a Mini-App session against the
//! ordering backend: the persisted cart, catalog loading, buyer identity,
//! the guarded checkout flow and text rendering.
//!
//! # Modules
//!
//! - [`store`] - Persisted key-value store (file-backed or in memory)
//! - [`cart`] - Cart manager mirroring the cart into the store
//! - [`catalog`] - Catalog sources and the lenient page parser
//! - [`identity`] - Buyer identity resolution
//! - [`api`] - Backend HTTP client with cookie-based anti-forgery tokens
//! - [`checkout`] - Checkout state machine and submit-control guard
//! - [`host`] - Host runtime seam (readiness, notices, haptics, navigation)
//! - [`bootstrap`] - Bounded wait for host readiness
//! - [`view`] - View models and askama templates
//! - [`session`] - The [`MiniApp`] session object

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod bootstrap;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod filters;
pub mod host;
pub mod identity;
pub mod session;
pub mod store;
pub mod view;

pub use api::{BackendClient, OrderError};
pub use bootstrap::{ReadyPolicy, await_ready};
pub use cart::CartManager;
pub use catalog::{CatalogLoadError, CatalogSource};
pub use checkout::{Checkout, CheckoutError, OrderGateway, SkipReason};
pub use config::{ClientConfig, ConfigError};
pub use error::{AppError, Result};
pub use host::{Haptic, HostRuntime, Notice, Page, Readiness};
pub use session::MiniApp;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
