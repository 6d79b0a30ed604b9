//! Cart editing commands.

use askama::Template;
use food_miniapp_client::Page;
use food_miniapp_core::{ProductId, QuantityChange};

use super::session::TerminalApp;
use super::{CliError, emit};

/// Add one unit of `id`.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted or output fails.
pub fn add(app: &mut TerminalApp, id: ProductId) -> Result<(), CliError> {
    let quantity = app.add_to_cart(id)?;
    let name = app
        .catalog()
        .find(id)
        .map_or_else(|| format!("#{id}"), |product| product.name.clone());
    emit(&format!(
        "{name} savatga qo'shildi (x{quantity}). Savat: {}",
        app.badge().count
    ))
}

/// Change the quantity of `id` by `delta`.
///
/// # Errors
///
/// Returns an error if the cart cannot be persisted or output fails.
pub fn change(app: &mut TerminalApp, id: ProductId, delta: i64) -> Result<(), CliError> {
    let message = match app.change_quantity(id, delta)? {
        QuantityChange::NotInCart => format!("#{id} savatda yo'q."),
        QuantityChange::Updated(quantity) => format!("#{id}: {quantity} ta."),
        QuantityChange::Removed => format!("#{id} savatdan olib tashlandi."),
    };
    emit(&message)
}

/// Render the cart page.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn show(app: &mut TerminalApp) -> Result<(), CliError> {
    app.show(Page::Cart);
    emit(&app.cart_view().render()?)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the persisted cart cannot be removed.
pub fn clear(app: &mut TerminalApp) -> Result<(), CliError> {
    app.clear_cart()?;
    emit("Savat tozalandi.")
}
