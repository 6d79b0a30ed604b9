//! Show the menu.

use askama::Template;
use food_miniapp_core::CategoryFilter;

use super::session::TerminalApp;
use super::{CliError, emit};

/// Render the catalog filtered by `category`.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn show(app: &TerminalApp, category: &str) -> Result<(), CliError> {
    let filter = CategoryFilter::parse(category);
    let view = if filter == CategoryFilter::All {
        app.catalog_view(&filter)
    } else {
        app.select_category(&filter)
    };
    emit(&view.render()?)
}
