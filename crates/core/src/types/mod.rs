//! Core types for the Mini-App.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod buyer;
pub mod id;
pub mod price;
pub mod product;

pub use buyer::{BuyerId, BuyerIdError, BuyerIdentity};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{PLACEHOLDER_IMAGE_URL, Product};
