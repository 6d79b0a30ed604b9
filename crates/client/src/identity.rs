//! Buyer identity resolution.
//!
//! The host runtime is the source of truth: when it supplies an identity,
//! that identity is used and written to the store, replacing whatever was
//! persisted. Without a host identity the persisted id is used. Logging out
//! removes the persisted id.

use food_miniapp_core::{BuyerId, BuyerIdentity};
use tracing::{debug, info, warn};

use crate::host::HostRuntime;
use crate::store::{KeyValueStore, StoreError, keys};

/// Resolve the buyer for this session.
pub fn resolve<H, S>(host: &H, store: &S) -> Option<BuyerIdentity>
where
    H: HostRuntime,
    S: KeyValueStore,
{
    if let Some(identity) = host.identity() {
        let persisted = read_persisted(store);
        if persisted != Some(identity.id) {
            if let Err(e) = store.set(keys::BUYER_ID, &identity.id.to_string()) {
                warn!(error = %e, "Failed to persist buyer id");
            }
            info!(buyer_id = %identity.id, "Buyer identity from host");
        }
        return Some(identity);
    }

    let identity = read_persisted(store).map(BuyerIdentity::anonymous);
    match &identity {
        Some(identity) => debug!(buyer_id = %identity.id, "Buyer identity from store"),
        None => debug!("No buyer identity available"),
    }
    identity
}

/// Forget the persisted buyer id.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn forget<S: KeyValueStore>(store: &S) -> Result<(), StoreError> {
    store.remove(keys::BUYER_ID)?;
    info!("Buyer identity removed");
    Ok(())
}

fn read_persisted<S: KeyValueStore>(store: &S) -> Option<BuyerId> {
    match store.get(keys::BUYER_ID) {
        Ok(Some(raw)) => match BuyerId::parse(&raw) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid persisted buyer id");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read persisted buyer id");
            None
        }
    }
}
