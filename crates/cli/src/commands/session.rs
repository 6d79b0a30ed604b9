//! Session setup and logout.

use food_miniapp_client::{
    AppError, BackendClient, ClientConfig, FileStore, MiniApp, await_ready, catalog, identity,
};
use tracing::info;

use super::{CliError, emit};
use crate::terminal::TerminalHost;

/// The session type every command runs against.
pub type TerminalApp = MiniApp<FileStore, BackendClient, TerminalHost>;

/// Open a session: wait for the host, resolve the buyer, load the catalog
/// and restore the cart.
///
/// # Errors
///
/// Returns an error if the host never becomes ready, the HTTP client cannot
/// be built or the catalog source cannot be read.
pub async fn open(config: &ClientConfig) -> Result<TerminalApp, AppError> {
    let host = TerminalHost::new(config.buyer_id);
    await_ready(&host, config.ready).await?;

    let store = FileStore::new(&config.state_dir);
    let buyer = identity::resolve(&host, &store);

    let backend = BackendClient::new(config.clone())?;
    let catalog = catalog::load(
        &config.catalog_source,
        &backend,
        buyer.as_ref().map(|identity| identity.id),
    )
    .await?;

    info!(state_dir = %config.state_dir.display(), "Session opened");
    Ok(MiniApp::new(store, catalog, buyer, backend, host))
}

/// Forget the persisted buyer id.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn logout(app: &mut TerminalApp) -> Result<(), CliError> {
    app.logout()?;
    emit("Chiqildi.")
}
