//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Currency suffix shown after every amount.
pub const CURRENCY_SUFFIX: &str = "so'm";

/// Formats an amount with the currency suffix.
///
/// Usage in templates: `{{ total|money }}` renders `102 000 so'm`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value} {CURRENCY_SUFFIX}"))
}
