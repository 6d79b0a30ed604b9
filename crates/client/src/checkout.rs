//! Checkout flow.
//!
//! A checkout moves `Idle -> Submitting -> Idle`. While submitting, the
//! triggering control is disabled and relabelled; a [`ControlGuard`] puts it
//! back however the submission ends, including on early return or when the
//! future is dropped mid-request. The disabled control is the only thing
//! preventing a second concurrent checkout.

use std::future::Future;

use food_miniapp_core::{BuyerIdentity, Catalog, Order, OrderReceipt};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::api::OrderError;
use crate::cart::CartManager;
use crate::host::{HostRuntime, Notice, Page};
use crate::store::KeyValueStore;

/// Label shown on the control while an order is in flight.
pub const SUBMITTING_LABEL: &str = "Yuborilmoqda...";

/// Default label of the checkout control.
pub const CHECKOUT_LABEL: &str = "Buyurtma berish";

/// Submits orders to the backend.
pub trait OrderGateway {
    /// Submit `order`, issuing exactly one request.
    fn submit(&self, order: &Order) -> impl Future<Output = Result<OrderReceipt, OrderError>> + Send;
}

/// The control that triggers checkout.
pub trait SubmitControl {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn label(&self) -> &str;
    fn set_label(&mut self, label: &str);
}

/// A plain in-memory checkout button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    enabled: bool,
    label: String,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            enabled: true,
            label: CHECKOUT_LABEL.to_string(),
        }
    }
}

impl SubmitControl for SubmitButton {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: &str) {
        label.clone_into(&mut self.label);
    }
}

/// Disables a control for its lifetime and restores it on drop.
pub struct ControlGuard<'a, C: SubmitControl> {
    control: &'a mut C,
    label: String,
}

impl<'a, C: SubmitControl> ControlGuard<'a, C> {
    /// Disable `control` and show `busy_label` until the guard is dropped.
    pub fn engage(control: &'a mut C, busy_label: &str) -> Self {
        let label = control.label().to_string();
        control.set_enabled(false);
        control.set_label(busy_label);
        Self { control, label }
    }
}

impl<C: SubmitControl> Drop for ControlGuard<'_, C> {
    fn drop(&mut self) {
        self.control.set_label(&self.label);
        self.control.set_enabled(true);
    }
}

/// Where the checkout state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
}

/// Holds the state at `Submitting` and puts it back to `Idle` on drop.
struct SubmittingState<'a>(&'a mut CheckoutState);

impl<'a> SubmittingState<'a> {
    fn enter(state: &'a mut CheckoutState) -> Self {
        *state = CheckoutState::Submitting;
        Self(state)
    }
}

impl Drop for SubmittingState<'_> {
    fn drop(&mut self) {
        *self.0 = CheckoutState::Idle;
    }
}

/// Why a checkout did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The cart is empty.
    EmptyCart,
    /// The cart only references products missing from the catalog.
    NothingResolvable,
    /// The control was already disabled.
    ControlDisabled,
}

/// Result of a checkout attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkout {
    /// The backend accepted the order and the cart was cleared.
    Placed(OrderReceipt),
    /// Nothing was submitted.
    Skipped(SkipReason),
}

/// Errors that end a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No buyer identity could be resolved.
    #[error("buyer identity is unavailable")]
    MissingIdentity,

    /// The order could not be submitted.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Drives checkouts through an [`OrderGateway`].
#[derive(Debug)]
pub struct CheckoutController<G> {
    gateway: G,
    state: CheckoutState,
}

impl<G: OrderGateway> CheckoutController<G> {
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: CheckoutState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run one checkout.
    ///
    /// On success the cart is cleared, the buyer is notified and the host
    /// navigates back to the catalog. On failure the cart is untouched and
    /// the buyer sees a generic failure notice. The control is re-enabled
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingIdentity`] before any network call
    /// when `identity` is `None`, and [`CheckoutError::Order`] when the
    /// submission fails.
    #[instrument(skip_all, fields(buyer_id = identity.map(|i| i.id.as_i64())))]
    pub async fn run<S, H, C>(
        &mut self,
        cart: &mut CartManager<S>,
        catalog: &Catalog,
        identity: Option<&BuyerIdentity>,
        comment: Option<&str>,
        host: &H,
        control: &mut C,
    ) -> Result<Checkout, CheckoutError>
    where
        S: KeyValueStore,
        H: HostRuntime,
        C: SubmitControl,
    {
        if !control.is_enabled() {
            debug!("Checkout control is disabled, ignoring");
            return Ok(Checkout::Skipped(SkipReason::ControlDisabled));
        }

        let Some(identity) = identity else {
            warn!("Checkout without buyer identity");
            host.notify(&Notice::IdentityUnavailable);
            return Err(CheckoutError::MissingIdentity);
        };

        if cart.is_empty() {
            debug!("Cart is empty, nothing to submit");
            return Ok(Checkout::Skipped(SkipReason::EmptyCart));
        }

        let Some(order) = cart.compute_order(identity.id, catalog) else {
            warn!(
                lines = cart.snapshot().len(),
                "No cart entry resolves to a catalog product"
            );
            return Ok(Checkout::Skipped(SkipReason::NothingResolvable));
        };
        let order = order.with_comment(comment);

        let result = {
            let _control = ControlGuard::engage(control, SUBMITTING_LABEL);
            let _state = SubmittingState::enter(&mut self.state);
            self.gateway.submit(&order).await
        };

        match result {
            Ok(receipt) => {
                if let Err(e) = cart.clear() {
                    error!(error = %e, "Order placed but the persisted cart could not be cleared");
                }
                info!(
                    order_id = ?receipt.order_id,
                    total = %receipt.total_price,
                    "Checkout complete"
                );
                host.notify(&Notice::OrderPlaced(receipt.clone()));
                host.navigate(Page::Catalog);
                Ok(Checkout::Placed(receipt))
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed, cart kept");
                host.notify(&Notice::OrderFailed);
                Err(CheckoutError::Order(e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use food_miniapp_core::{BuyerId, Price, Product, ProductId};

    use super::*;
    use crate::host::{Haptic, Readiness};
    use crate::store::{MemoryStore, keys};

    /// Gateway answering every order with a fixed outcome.
    struct FakeGateway {
        reject_with: Option<u16>,
        calls: AtomicUsize,
        last_order: Mutex<Option<Order>>,
    }

    impl FakeGateway {
        fn accepting() -> Self {
            Self {
                reject_with: None,
                calls: AtomicUsize::new(0),
                last_order: Mutex::new(None),
            }
        }

        fn rejecting(status: u16) -> Self {
            Self {
                reject_with: Some(status),
                ..Self::accepting()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OrderGateway for FakeGateway {
        async fn submit(&self, order: &Order) -> Result<OrderReceipt, OrderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_order.lock().unwrap() = Some(order.clone());
            match self.reject_with {
                Some(status) => Err(OrderError::Rejected {
                    status,
                    message: "rejected".to_string(),
                }),
                None => Ok(OrderReceipt::for_order(order, None)),
            }
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        notices: Mutex<Vec<Notice>>,
        pages: Mutex<Vec<Page>>,
    }

    impl HostRuntime for RecordingHost {
        async fn ready(&self) -> Readiness {
            Readiness::Ready
        }

        fn identity(&self) -> Option<BuyerIdentity> {
            None
        }

        fn notify(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.clone());
        }

        fn haptic(&self, _feedback: Haptic) {}

        fn navigate(&self, page: Page) {
            self.pages.lock().unwrap().push(page);
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new(ProductId::new(1), "Truffle Burger", Price::new(45_000), "burger", ""),
            Product::new(ProductId::new(2), "Classic Cola", Price::new(12_000), "drink", ""),
        ])
    }

    fn buyer() -> BuyerIdentity {
        BuyerIdentity::anonymous(BuyerId::new(777).unwrap())
    }

    fn filled_cart(store: &MemoryStore) -> CartManager<MemoryStore> {
        let mut cart = CartManager::restore(store.clone());
        cart.add(ProductId::new(1)).unwrap();
        cart.add(ProductId::new(1)).unwrap();
        cart.add(ProductId::new(2)).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_successful_checkout_clears_cart() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        let mut controller = CheckoutController::new(FakeGateway::accepting());

        let outcome = controller
            .run(&mut cart, &catalog(), Some(&buyer()), Some("extra sauce"), &host, &mut button)
            .await
            .unwrap();

        let Checkout::Placed(receipt) = outcome else {
            panic!("expected a placed order, got {outcome:?}");
        };
        assert_eq!(receipt.total_price, Price::new(102_000));
        assert_eq!(receipt.item_count, 3);

        let sent = controller.gateway().last_order.lock().unwrap().clone().unwrap();
        assert_eq!(sent.buyer_id.as_i64(), 777);
        assert_eq!(sent.comment.as_deref(), Some("extra sauce"));

        assert!(cart.is_empty());
        assert!(store.get(keys::CART).unwrap().is_none());
        assert!(button.is_enabled());
        assert_eq!(button.label(), CHECKOUT_LABEL);
        assert_eq!(controller.state(), CheckoutState::Idle);
        assert_eq!(*host.pages.lock().unwrap(), vec![Page::Catalog]);
        assert!(matches!(
            host.notices.lock().unwrap().as_slice(),
            [Notice::OrderPlaced(_)]
        ));
    }

    #[tokio::test]
    async fn test_rejected_checkout_keeps_cart() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let before = store.get(keys::CART).unwrap();
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        let mut controller = CheckoutController::new(FakeGateway::rejecting(500));

        let err = controller
            .run(&mut cart, &catalog(), Some(&buyer()), None, &host, &mut button)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Order(OrderError::Rejected { status: 500, .. })));
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(store.get(keys::CART).unwrap(), before);
        assert!(button.is_enabled());
        assert_eq!(button.label(), CHECKOUT_LABEL);
        assert!(host.pages.lock().unwrap().is_empty());
        assert_eq!(*host.notices.lock().unwrap(), vec![Notice::OrderFailed]);
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_call() {
        let mut cart = CartManager::restore(MemoryStore::new());
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        let mut controller = CheckoutController::new(FakeGateway::accepting());

        let outcome = controller
            .run(&mut cart, &catalog(), Some(&buyer()), None, &host, &mut button)
            .await
            .unwrap();

        assert_eq!(outcome, Checkout::Skipped(SkipReason::EmptyCart));
        assert_eq!(controller.gateway().calls(), 0);
        assert!(host.notices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_notifies_without_call() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        let mut controller = CheckoutController::new(FakeGateway::accepting());

        let err = controller
            .run(&mut cart, &catalog(), None, None, &host, &mut button)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::MissingIdentity));
        assert_eq!(controller.gateway().calls(), 0);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(*host.notices.lock().unwrap(), vec![Notice::IdentityUnavailable]);
    }

    #[tokio::test]
    async fn test_stale_only_cart_is_skipped() {
        let mut cart = CartManager::restore(MemoryStore::new());
        cart.add(ProductId::new(99)).unwrap();
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        let mut controller = CheckoutController::new(FakeGateway::accepting());

        let outcome = controller
            .run(&mut cart, &catalog(), Some(&buyer()), None, &host, &mut button)
            .await
            .unwrap();

        assert_eq!(outcome, Checkout::Skipped(SkipReason::NothingResolvable));
        assert_eq!(controller.gateway().calls(), 0);
        assert_eq!(cart.total_item_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_control_is_ignored() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        button.set_enabled(false);
        let mut controller = CheckoutController::new(FakeGateway::accepting());

        let outcome = controller
            .run(&mut cart, &catalog(), Some(&buyer()), None, &host, &mut button)
            .await
            .unwrap();

        assert_eq!(outcome, Checkout::Skipped(SkipReason::ControlDisabled));
        assert_eq!(controller.gateway().calls(), 0);
        assert!(!button.is_enabled());
    }

    /// Gateway whose request never completes.
    struct Hanging;

    impl OrderGateway for Hanging {
        async fn submit(&self, _order: &Order) -> Result<OrderReceipt, OrderError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_abandoned_checkout_returns_to_idle() {
        let store = MemoryStore::new();
        let mut cart = filled_cart(&store);
        let host = RecordingHost::default();
        let mut button = SubmitButton::default();
        let mut controller = CheckoutController::new(Hanging);

        let catalog = catalog();
        let buyer = buyer();
        let run = controller.run(&mut cart, &catalog, Some(&buyer), None, &host, &mut button);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), run).await;
        assert!(timed_out.is_err());

        assert_eq!(controller.state(), CheckoutState::Idle);
        assert!(button.is_enabled());
        assert_eq!(button.label(), CHECKOUT_LABEL);
        assert_eq!(cart.total_item_count(), 3);
        assert!(host.notices.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submitting_state_resets_on_drop() {
        let mut state = CheckoutState::Idle;
        {
            let guard = SubmittingState::enter(&mut state);
            assert_eq!(*guard.0, CheckoutState::Submitting);
        }
        assert_eq!(state, CheckoutState::Idle);
    }

    #[test]
    fn test_control_guard_restores_on_drop() {
        let mut button = SubmitButton::default();
        {
            let _guard = ControlGuard::engage(&mut button, SUBMITTING_LABEL);
        }
        assert!(button.is_enabled());
        assert_eq!(button.label(), CHECKOUT_LABEL);
    }

    #[test]
    fn test_control_guard_disables_while_held() {
        let mut button = SubmitButton::default();
        let guard = ControlGuard::engage(&mut button, SUBMITTING_LABEL);
        assert!(!guard.control.is_enabled());
        assert_eq!(guard.control.label(), SUBMITTING_LABEL);
        drop(guard);
        assert!(button.is_enabled());
    }
}
