//! Order payload and receipt.
//!
//! An [`Order`] is built from the cart at checkout time and is never
//! persisted. Its JSON form is the body the backend's order endpoint expects:
//!
//! ```json
//! {"telegram_id": 777, "items": [{"product_id": 1, "quantity": 2}], "total_price": 90000}
//! ```

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BuyerId, OrderId, Price, ProductId};

/// One product and its quantity in an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: NonZeroU32,
}

/// An order ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "telegram_id")]
    pub buyer_id: BuyerId,
    #[serde(rename = "items")]
    pub line_items: Vec<LineItem>,
    pub total_price: Price,
    /// Free-text note stored with the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Order {
    /// Attach a note; blank notes are dropped.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<&str>) -> Self {
        self.comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        self
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.line_items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

/// Confirmation of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Backend-assigned order number, when the response carried one.
    pub order_id: Option<OrderId>,
    pub total_price: Price,
    pub item_count: u64,
    pub submitted_at: DateTime<Utc>,
}

impl OrderReceipt {
    /// Receipt for `order`, stamped with the current time.
    #[must_use]
    pub fn for_order(order: &Order, order_id: Option<OrderId>) -> Self {
        Self {
            order_id,
            total_price: order.total_price,
            item_count: order.item_count(),
            submitted_at: Utc::now(),
        }
    }
}
