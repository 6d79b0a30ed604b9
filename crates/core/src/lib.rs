//! Food Mini-App Core - Shared types library.
//!
//! This crate provides the domain types used across all Mini-App components:
//! - `client` - Cart manager, checkout flow and backend client
//! - `cli` - Terminal front-end that drives the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! persistence, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, buyer identity, prices and products
//! - [`catalog`] - Ordered product list with lookup and category filtering
//! - [`cart`] - Quantity-keyed cart with its positivity invariant
//! - [`order`] - Order payload derived from a cart at checkout time

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::{Cart, QuantityChange};
pub use catalog::{
    Catalog, CatalogError, CategoryFilter, ParsedCatalog, ProductLookup, RejectedRecord,
};
pub use order::{LineItem, Order, OrderReceipt};
pub use types::*;
