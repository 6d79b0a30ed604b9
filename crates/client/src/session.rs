//! The Mini-App session.
//!
//! [`MiniApp`] owns everything one session needs: the cart manager, the
//! catalog, the resolved buyer, the host runtime and the checkout control.
//! Front ends construct it once and route every user action through it.

use std::num::NonZeroU32;

use food_miniapp_core::{BuyerIdentity, Catalog, CategoryFilter, ProductId, QuantityChange};
use tracing::{debug, info};

use crate::cart::CartManager;
use crate::checkout::{Checkout, CheckoutController, OrderGateway, SubmitButton, SubmitControl};
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::host::{Haptic, HostRuntime, Page};
use crate::identity;
use crate::store::KeyValueStore;
use crate::view::{Badge, CartView, CatalogView};

/// One Mini-App session.
pub struct MiniApp<S, G, H> {
    cart: CartManager<S>,
    store: S,
    catalog: Catalog,
    identity: Option<BuyerIdentity>,
    host: H,
    checkout: CheckoutController<G>,
    button: SubmitButton,
    page: Page,
}

impl<S, G, H> MiniApp<S, G, H>
where
    S: KeyValueStore + Clone,
    G: OrderGateway,
    H: HostRuntime,
{
    /// Start a session, restoring the cart from `store`.
    pub fn new(
        store: S,
        catalog: Catalog,
        identity: Option<BuyerIdentity>,
        gateway: G,
        host: H,
    ) -> Self {
        if let Some(identity) = &identity {
            set_sentry_user(&identity.id, identity.first_name.as_deref());
        }
        let cart = CartManager::restore(store.clone());
        info!(
            products = catalog.len(),
            buyer_id = identity.as_ref().map(|i| i.id.as_i64()),
            cart_items = cart.total_item_count(),
            "Session started"
        );

        Self {
            cart,
            store,
            catalog,
            identity,
            host,
            checkout: CheckoutController::new(gateway),
            button: SubmitButton::default(),
            page: Page::Catalog,
        }
    }

    /// Start a session, resolving the buyer through the host.
    pub fn with_resolved_identity(store: S, catalog: Catalog, gateway: G, host: H) -> Self {
        let identity = identity::resolve(&host, &store);
        Self::new(store, catalog, identity, gateway, host)
    }

    /// Add one unit of `id` to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_to_cart(&mut self, id: ProductId) -> Result<NonZeroU32> {
        let quantity = self.cart.add(id)?;
        self.host.haptic(Haptic::Success);
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        debug!(product_id = %id, quantity = quantity.get(), "Added to cart");
        Ok(quantity)
    }

    /// Change the quantity of `id` by `delta`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn change_quantity(&mut self, id: ProductId, delta: i64) -> Result<QuantityChange> {
        let change = self.cart.change_quantity(id, delta)?;
        if change.is_mutation() {
            self.host.haptic(Haptic::ImpactLight);
            add_breadcrumb(
                "cart",
                "Changed quantity",
                Some(&[
                    ("product_id", id.to_string().as_str()),
                    ("delta", delta.to_string().as_str()),
                ]),
            );
        }
        debug!(product_id = %id, delta, ?change, "Changed quantity");
        Ok(change)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted cart cannot be removed.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear()?;
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(())
    }

    /// Submit the cart as an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the buyer is unknown or the order fails.
    pub async fn checkout(&mut self, comment: Option<&str>) -> Result<Checkout> {
        add_breadcrumb("checkout", "Checkout started", None);
        let outcome = self
            .checkout
            .run(
                &mut self.cart,
                &self.catalog,
                self.identity.as_ref(),
                comment,
                &self.host,
                &mut self.button,
            )
            .await?;
        if matches!(outcome, Checkout::Placed(_)) {
            self.page = Page::Catalog;
        }
        Ok(outcome)
    }

    /// Forget the buyer.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted id cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        identity::forget(&self.store)?;
        self.identity = None;
        clear_sentry_user();
        Ok(())
    }

    /// Switch to `page`.
    pub fn show(&mut self, page: Page) {
        self.page = page;
        self.host.navigate(page);
        self.host.haptic(Haptic::ImpactMedium);
    }

    /// Change the category filter and return the filtered catalog.
    pub fn select_category(&self, filter: &CategoryFilter) -> CatalogView {
        self.host.haptic(Haptic::SelectionChanged);
        self.catalog_view(filter)
    }

    #[must_use]
    pub fn catalog_view(&self, filter: &CategoryFilter) -> CatalogView {
        let greeting = self
            .identity
            .as_ref()
            .and_then(|identity| identity.first_name.as_deref());
        CatalogView::build(&self.catalog, filter, self.cart.snapshot(), greeting)
    }

    #[must_use]
    pub fn cart_view(&self) -> CartView {
        CartView::build(self.cart.snapshot(), &self.catalog)
    }

    #[must_use]
    pub fn badge(&self) -> Badge {
        Badge::new(self.cart.total_item_count())
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&BuyerIdentity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager<S> {
        &self.cart
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub const fn page(&self) -> Page {
        self.page
    }

    /// Whether the checkout control accepts input.
    #[must_use]
    pub fn can_checkout(&self) -> bool {
        self.button.is_enabled() && !self.cart.is_empty()
    }
}
