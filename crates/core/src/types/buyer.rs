//! Buyer identity types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`BuyerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuyerIdError {
    /// The input string is empty.
    #[error("buyer id cannot be empty")]
    Empty,
    /// The input is not an integer.
    #[error("buyer id must be an integer: {0}")]
    NotANumber(#[from] core::num::ParseIntError),
    /// The value is zero or negative.
    #[error("buyer id must be positive (got {0})")]
    NotPositive(i64),
}

/// A buyer's Telegram user id.
///
/// ## Constraints
///
/// - Strictly positive (Telegram never issues zero or negative user ids;
///   negative ids belong to groups and channels)
///
/// ## Examples
///
/// ```
/// use food_miniapp_core::BuyerId;
///
/// assert!(BuyerId::parse("123456789").is_ok());
/// assert!(BuyerId::parse("").is_err());
/// assert!(BuyerId::parse("-100200300").is_err());
/// assert!(BuyerId::parse("null").is_err());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "i64")]
pub struct BuyerId(i64);

impl BuyerId {
    /// Create a buyer id from a raw Telegram id.
    ///
    /// # Errors
    ///
    /// Returns [`BuyerIdError::NotPositive`] if `id` is zero or negative.
    pub const fn new(id: i64) -> Result<Self, BuyerIdError> {
        if id <= 0 {
            return Err(BuyerIdError::NotPositive(id));
        }
        Ok(Self(id))
    }

    /// Parse a `BuyerId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not an integer, or not
    /// positive.
    pub fn parse(s: &str) -> Result<Self, BuyerIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BuyerIdError::Empty);
        }
        Self::new(s.parse::<i64>()?)
    }

    /// Get the underlying Telegram id.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BuyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BuyerId {
    type Err = BuyerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<i64> for BuyerId {
    type Error = BuyerIdError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<BuyerId> for i64 {
    fn from(id: BuyerId) -> Self {
        id.0
    }
}

/// The identity of the buyer using the Mini-App.
///
/// Only the id is persisted; the display name is available when the host
/// runtime supplied the identity during this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerIdentity {
    /// Telegram user id.
    pub id: BuyerId,
    /// Telegram first name, for greeting the buyer.
    pub first_name: Option<String>,
}

impl BuyerIdentity {
    /// Identity with no display name.
    #[must_use]
    pub const fn anonymous(id: BuyerId) -> Self {
        Self {
            id,
            first_name: None,
        }
    }
}
