//! Cart manager.
//!
//! Owns the session's [`Cart`] and mirrors it into a [`KeyValueStore`] after
//! every mutation. The persisted copy is only read once, when the manager is
//! restored, and is never modified by anything else.

use std::num::NonZeroU32;

use food_miniapp_core::{BuyerId, Cart, Order, Price, ProductId, ProductLookup, QuantityChange};
use tracing::{debug, warn};

use crate::store::{KeyValueStore, StoreError, keys};

/// The session's cart and its persisted mirror.
#[derive(Debug)]
pub struct CartManager<S> {
    cart: Cart,
    store: S,
}

impl<S: KeyValueStore> CartManager<S> {
    /// Restore the cart from `store`.
    ///
    /// A missing, unreadable or unparsable entry yields an empty cart; the
    /// problem is logged and never fatal.
    pub fn restore(store: S) -> Self {
        let cart = match store.get(keys::CART) {
            Ok(Some(json)) => match Cart::from_json(&json) {
                Ok((cart, 0)) => cart,
                Ok((cart, dropped)) => {
                    warn!(dropped, "Dropped non-positive entries from persisted cart");
                    cart
                }
                Err(e) => {
                    warn!(error = %e, "Persisted cart is corrupt, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                Cart::new()
            }
        };

        debug!(
            lines = cart.len(),
            items = cart.total_item_count(),
            "Cart restored"
        );
        Self { cart, store }
    }

    /// Add one unit of `id` and persist. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted. The in-memory cart
    /// has already been updated.
    pub fn add(&mut self, id: ProductId) -> Result<NonZeroU32, StoreError> {
        let quantity = self.cart.add(id);
        self.save()?;
        Ok(quantity)
    }

    /// Change the quantity of `id` by `delta` and persist.
    ///
    /// No-op (and no write) if `id` is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted. The in-memory cart
    /// has already been updated.
    pub fn change_quantity(
        &mut self,
        id: ProductId,
        delta: i64,
    ) -> Result<QuantityChange, StoreError> {
        let change = self.cart.change_quantity(id, delta);
        if change.is_mutation() {
            self.save()?;
        }
        Ok(change)
    }

    /// Empty the cart and remove the persisted copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted copy cannot be removed. The
    /// in-memory cart is empty regardless.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.cart.clear();
        self.store.remove(keys::CART)
    }

    /// Sum of all quantities, for the cart badge.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Total price of entries that resolve through `lookup`.
    #[must_use]
    pub fn total_price(&self, lookup: &impl ProductLookup) -> Price {
        self.cart.total_price(lookup)
    }

    /// Build the order for the current cart, or `None` if there is nothing to
    /// submit.
    #[must_use]
    pub fn compute_order(&self, buyer_id: BuyerId, lookup: &impl ProductLookup) -> Option<Order> {
        self.cart.compute_order(buyer_id, lookup)
    }

    /// Read-only view of the cart.
    #[must_use]
    pub const fn snapshot(&self) -> &Cart {
        &self.cart
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    fn save(&self) -> Result<(), StoreError> {
        let json = self.cart.to_json()?;
        self.store.set(keys::CART, &json)
    }
}
