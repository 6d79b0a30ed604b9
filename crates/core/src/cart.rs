//! Quantity-keyed shopping cart.
//!
//! The cart maps product ids to strictly positive quantities. A quantity that
//! would drop to zero or below removes the entry, so no zero or negative
//! quantity can ever be observed or persisted. Entries iterate in ascending
//! product id order.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::Serialize;

use crate::catalog::ProductLookup;
use crate::order::{LineItem, Order};
use crate::types::{BuyerId, Price, ProductId};

/// Outcome of [`Cart::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The product was not in the cart; nothing changed.
    NotInCart,
    /// The entry now holds this quantity.
    Updated(NonZeroU32),
    /// The quantity reached zero or below and the entry was removed.
    Removed,
}

impl QuantityChange {
    /// Whether the cart was mutated.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::NotInCart)
    }
}

/// A shopping cart.
///
/// Serializes as a JSON object of id to quantity (`{"1":2,"2":1}`), which is
/// the persisted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<ProductId, NonZeroU32>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
        }
    }

    /// Rebuild a cart from its persisted form.
    ///
    /// Entries with a quantity of zero or below are dropped, and quantities
    /// above `u32::MAX` are capped. Returns the cart and the number of entries
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object of integer ids to integer
    /// quantities.
    pub fn from_json(json: &str) -> Result<(Self, usize), serde_json::Error> {
        let raw: BTreeMap<ProductId, i64> = serde_json::from_str(json)?;
        let mut dropped = 0;
        let mut cart = Self::new();
        for (id, quantity) in raw {
            match positive_quantity(quantity) {
                Some(quantity) => {
                    cart.lines.insert(id, quantity);
                }
                None => dropped += 1,
            }
        }
        Ok((cart, dropped))
    }

    /// Serialize to the persisted form.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails, which cannot happen for
    /// integer keys and values.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Add one unit of `id`, creating the entry at 1 if absent.
    ///
    /// Ids that are not in any catalog are accepted. Returns the new quantity.
    pub fn add(&mut self, id: ProductId) -> NonZeroU32 {
        let quantity = self
            .lines
            .get(&id)
            .map_or(NonZeroU32::MIN, |q| q.saturating_add(1));
        self.lines.insert(id, quantity);
        quantity
    }

    /// Change the quantity of `id` by a signed `delta`.
    ///
    /// Does nothing if `id` is not in the cart. Removes the entry when the
    /// result is zero or below.
    pub fn change_quantity(&mut self, id: ProductId, delta: i64) -> QuantityChange {
        let Some(current) = self.lines.get(&id).copied() else {
            return QuantityChange::NotInCart;
        };

        match positive_quantity(i64::from(current.get()).saturating_add(delta)) {
            Some(quantity) => {
                self.lines.insert(id, quantity);
                QuantityChange::Updated(quantity)
            }
            None => {
                self.lines.remove(&id);
                QuantityChange::Removed
            }
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of `id`, or 0 when absent.
    #[must_use]
    pub fn quantity(&self, id: ProductId) -> u32 {
        self.lines.get(&id).map_or(0, |q| q.get())
    }

    /// Whether the cart has any entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.values().map(|q| u64::from(q.get())).sum()
    }

    /// Entries in ascending product id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, NonZeroU32)> + '_ {
        self.lines.iter().map(|(id, q)| (*id, *q))
    }

    /// Total price of the entries that resolve through `lookup`.
    #[must_use]
    pub fn total_price(&self, lookup: &impl ProductLookup) -> Price {
        self.iter()
            .filter_map(|(id, q)| lookup.product(id).map(|p| p.price.times(q.get())))
            .sum()
    }

    /// Build the order for this cart.
    ///
    /// Entries whose product no longer resolves are skipped. Returns `None`
    /// when no entry resolves, including when the cart is empty; the caller
    /// must then skip submission.
    #[must_use]
    pub fn compute_order(&self, buyer_id: BuyerId, lookup: &impl ProductLookup) -> Option<Order> {
        let mut line_items = Vec::with_capacity(self.lines.len());
        let mut total_price = Price::ZERO;

        for (product_id, quantity) in self.iter() {
            let Some(product) = lookup.product(product_id) else {
                continue;
            };
            total_price = total_price.saturating_add(product.price.times(quantity.get()));
            line_items.push(LineItem {
                product_id,
                quantity,
            });
        }

        if line_items.is_empty() {
            return None;
        }

        Some(Order {
            buyer_id,
            line_items,
            total_price,
            comment: None,
        })
    }
}

fn positive_quantity(quantity: i64) -> Option<NonZeroU32> {
    if quantity <= 0 {
        return None;
    }
    let capped = u32::try_from(quantity).unwrap_or(u32::MAX);
    NonZeroU32::new(capped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::catalog::Catalog;
    use crate::types::Product;

    fn id(n: i32) -> ProductId {
        ProductId::new(n)
    }

    fn buyer() -> BuyerId {
        BuyerId::new(777).unwrap()
    }

    fn two_item_catalog() -> Catalog {
        Catalog::new(vec![
            Product::new(id(1), "Truffle Burger", Price::new(45000), "burger", "a"),
            Product::new(id(2), "Classic Cola", Price::new(12000), "drink", "b"),
        ])
    }

    #[test]
    fn test_add_twice_yields_two_and_leaves_others() {
        let mut cart = Cart::new();
        cart.add(id(2));
        cart.add(id(1));
        cart.add(id(1));
        assert_eq!(cart.quantity(id(1)), 2);
        assert_eq!(cart.quantity(id(2)), 1);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_accepts_unknown_ids() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(id(999)).get(), 1);
        assert_eq!(cart.total_item_count(), 1);
    }

    #[test]
    fn test_change_quantity_not_in_cart_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.change_quantity(id(1), 5), QuantityChange::NotInCart);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_to_zero_or_below_removes() {
        let mut cart = Cart::new();
        cart.add(id(1));
        cart.add(id(1));
        assert_eq!(cart.change_quantity(id(1), -2), QuantityChange::Removed);
        assert_eq!(cart.quantity(id(1)), 0);

        cart.add(id(3));
        assert_eq!(cart.change_quantity(id(3), -10), QuantityChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_updates() {
        let mut cart = Cart::new();
        cart.add(id(1));
        let change = cart.change_quantity(id(1), 4);
        assert_eq!(change, QuantityChange::Updated(NonZeroU32::new(5).unwrap()));
        assert!(change.is_mutation());
    }

    #[test]
    fn test_change_quantity_saturates() {
        let mut cart = Cart::new();
        cart.add(id(1));
        cart.change_quantity(id(1), i64::MAX);
        assert_eq!(cart.quantity(id(1)), u32::MAX);
        assert_eq!(cart.add(id(1)).get(), u32::MAX);
    }

    #[test]
    fn test_worked_example() {
        let catalog = two_item_catalog();
        let mut cart = Cart::new();
        cart.add(id(1));
        cart.add(id(1));
        cart.add(id(2));

        assert_eq!(cart.to_json().unwrap(), r#"{"1":2,"2":1}"#);
        assert_eq!(cart.total_item_count(), 3);

        let order = cart.compute_order(buyer(), &catalog).unwrap();
        assert_eq!(order.total_price, Price::new(102_000));
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(cart.total_price(&catalog), Price::new(102_000));
    }

    #[test]
    fn test_compute_order_skips_stale_products() {
        let catalog = two_item_catalog();
        let mut cart = Cart::new();
        cart.add(id(1));
        cart.add(id(42));

        let order = cart.compute_order(buyer(), &catalog).unwrap();
        assert_eq!(order.line_items, vec![LineItem {
            product_id: id(1),
            quantity: NonZeroU32::MIN,
        }]);
        assert_eq!(order.total_price, Price::new(45000));
    }

    #[test]
    fn test_compute_order_empty_or_unresolvable_is_none() {
        let catalog = two_item_catalog();
        let mut cart = Cart::new();
        assert!(cart.compute_order(buyer(), &catalog).is_none());

        cart.add(id(42));
        assert!(cart.compute_order(buyer(), &catalog).is_none());
    }

    #[test]
    fn test_from_json_drops_non_positive_entries() {
        let (cart, dropped) = Cart::from_json(r#"{"1": 2, "2": 0, "3": -4, "4": 1}"#).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.quantity(id(2)), 0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Cart::from_json("[1, 2]").is_err());
        assert!(Cart::from_json(r#"{"burger": 1}"#).is_err());
        assert!(Cart::from_json("not json").is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i32),
        Change(i32, i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..6_i32).prop_map(Op::Add),
            (0..6_i32, -5..5_i64).prop_map(|(p, d)| Op::Change(p, d)),
        ]
    }

    proptest! {
        #[test]
        fn prop_quantities_stay_positive(ops in proptest::collection::vec(op(), 0..64)) {
            let mut cart = Cart::new();
            for op in ops {
                match op {
                    Op::Add(p) => { cart.add(id(p)); }
                    Op::Change(p, d) => { cart.change_quantity(id(p), d); }
                }
            }

            let (restored, dropped) = Cart::from_json(&cart.to_json().unwrap()).unwrap();
            prop_assert_eq!(dropped, 0);
            prop_assert_eq!(restored.total_item_count(), cart.total_item_count());
            for (_, quantity) in cart.iter() {
                prop_assert!(quantity.get() > 0);
            }
        }
    }
}
