//! Host runtime seam.
//!
//! The host runtime is the environment embedding the Mini-App (the Telegram
//! WebApp in production, a terminal in the CLI). It provides readiness,
//! buyer identity, dialogs, haptic feedback and navigation. Everything here
//! is a notification or a lookup; the Mini-App never depends on the host
//! acting on a call.

use std::fmt;
use std::future::Future;

use food_miniapp_core::{BuyerIdentity, OrderReceipt};

/// Whether the host has finished initializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Identity and dialogs are available.
    Ready,
    /// The host is still loading; ask again later.
    Pending,
}

/// Pages the Mini-App can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Catalog,
    Cart,
}

impl Page {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Cart => "cart",
        }
    }
}

/// Haptic feedback kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    /// Success notification, on adding to the cart.
    Success,
    /// Light impact, on changing a quantity.
    ImpactLight,
    /// Medium impact, on switching pages.
    ImpactMedium,
    /// Selection tick, on changing the category filter.
    SelectionChanged,
}

/// User-facing notices, shown by the host as native alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Checkout attempted without a buyer identity.
    IdentityUnavailable,
    /// The order was accepted.
    OrderPlaced(OrderReceipt),
    /// The order could not be submitted.
    OrderFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityUnavailable => f.write_str("Xatolik: Telegram ma'lumotlari yuklanmadi."),
            Self::OrderPlaced(receipt) => {
                f.write_str("Buyurtmangiz muvaffaqiyatli qabul qilindi!")?;
                if let Some(order_id) = receipt.order_id {
                    write!(f, " Buyurtma #{order_id}")?;
                }
                write!(
                    f,
                    " ({} ta, {} so'm, {})",
                    receipt.item_count,
                    receipt.total_price,
                    receipt
                        .submitted_at
                        .with_timezone(&chrono::Local)
                        .format("%H:%M | %d.%m.%Y")
                )
            }
            Self::OrderFailed => f.write_str("Xatolik: Buyurtmani yuborishda muammo yuz berdi."),
        }
    }
}

/// The embedding environment.
pub trait HostRuntime {
    /// Report whether the host has finished initializing.
    fn ready(&self) -> impl Future<Output = Readiness> + Send;

    /// The buyer identity the host vouches for, if any.
    fn identity(&self) -> Option<BuyerIdentity>;

    /// Show a notice to the user.
    fn notify(&self, notice: &Notice);

    /// Trigger haptic feedback.
    fn haptic(&self, feedback: Haptic);

    /// Switch the visible page.
    fn navigate(&self, page: Page);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_miniapp_core::{OrderId, Price};

    use super::*;

    #[test]
    fn test_order_placed_notice_mentions_order() {
        let receipt = OrderReceipt {
            order_id: Some(OrderId::new(42)),
            total_price: Price::new(102_000),
            item_count: 3,
            submitted_at: chrono::Utc::now(),
        };
        let text = Notice::OrderPlaced(receipt).to_string();
        assert!(text.starts_with("Buyurtmangiz muvaffaqiyatli qabul qilindi!"));
        assert!(text.contains("#42"));
        assert!(text.contains("102 000 so'm"));
    }

    #[test]
    fn test_failure_notice_is_generic() {
        assert_eq!(
            Notice::OrderFailed.to_string(),
            "Xatolik: Buyurtmani yuborishda muammo yuz berdi."
        );
    }

    #[test]
    fn test_page_names() {
        assert_eq!(Page::Catalog.as_str(), "catalog");
        assert_eq!(Page::default(), Page::Catalog);
    }
}
