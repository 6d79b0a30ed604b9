//! Submit the cart.

use food_miniapp_client::{Checkout, SkipReason};
use tracing::info;

use super::session::TerminalApp;
use super::{CliError, emit};

/// Submit the cart as an order.
///
/// The outcome notice is printed by the terminal host; skipped checkouts
/// are explained here.
///
/// # Errors
///
/// Returns an error if the buyer is unknown or the backend rejects the
/// order.
pub async fn submit(app: &mut TerminalApp, comment: Option<&str>) -> Result<(), CliError> {
    match app.checkout(comment).await? {
        Checkout::Placed(receipt) => {
            info!(order_id = ?receipt.order_id, "Order placed");
            Ok(())
        }
        Checkout::Skipped(SkipReason::EmptyCart) => emit("Savat bo'sh..."),
        Checkout::Skipped(SkipReason::NothingResolvable) => {
            emit("Savatdagi mahsulotlar menyuda topilmadi.")
        }
        Checkout::Skipped(SkipReason::ControlDisabled) => {
            emit("Buyurtma allaqachon yuborilmoqda.")
        }
    }
}
