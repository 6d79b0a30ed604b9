//! View models and rendering.
//!
//! Views are pure projections of session state. Building one never mutates
//! anything; rendering goes through askama templates in `templates/`.

use std::fmt;

use askama::Template;
use food_miniapp_core::{Cart, Catalog, CategoryFilter, Price, ProductId};

use crate::filters;

/// The cart count shown on the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub count: u64,
}

impl Badge {
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self { count }
    }

    /// The badge is hidden while the cart is empty.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.count > 0
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_visible() {
            write!(f, "{}", self.count)
        } else {
            Ok(())
        }
    }
}

/// A product tile in the catalog grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub image_url: String,
    /// Units of this product already in the cart.
    pub in_cart: u32,
}

/// The catalog page.
#[derive(Debug, Clone, Template)]
#[template(path = "catalog.txt")]
pub struct CatalogView {
    pub greeting: Option<String>,
    pub category_label: String,
    pub categories: Vec<String>,
    pub products: Vec<ProductCard>,
    pub badge: Badge,
}

impl CatalogView {
    #[must_use]
    pub fn build(
        catalog: &Catalog,
        filter: &CategoryFilter,
        cart: &Cart,
        greeting: Option<&str>,
    ) -> Self {
        let products = catalog
            .filter(filter)
            .map(|product| ProductCard {
                id: product.id,
                name: product.name.clone(),
                category: product.category.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                in_cart: cart.quantity(product.id),
            })
            .collect();

        Self {
            greeting: greeting.map(String::from),
            category_label: filter.label().to_string(),
            categories: catalog.categories().into_iter().map(String::from).collect(),
            products,
            badge: Badge::new(cart.total_item_count()),
        }
    }
}

/// One line of the cart page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// The cart page.
///
/// Entries whose product is no longer in the catalog are left out of the
/// lines and the totals.
#[derive(Debug, Clone, Template)]
#[template(path = "cart.txt")]
pub struct CartView {
    pub cart_is_empty: bool,
    pub lines: Vec<CartLine>,
    pub item_count: u64,
    pub subtotal: Price,
    pub total: Price,
}

impl CartView {
    #[must_use]
    pub fn build(cart: &Cart, catalog: &Catalog) -> Self {
        let lines: Vec<CartLine> = cart
            .iter()
            .filter_map(|(id, quantity)| {
                let product = catalog.find(id)?;
                Some(CartLine {
                    id,
                    name: product.name.clone(),
                    image_url: product.image_url.clone(),
                    quantity: quantity.get(),
                    unit_price: product.price,
                    line_total: product.price.times(quantity.get()),
                })
            })
            .collect();
        let subtotal = cart.total_price(catalog);
        let item_count = lines.iter().map(|line| u64::from(line.quantity)).sum();

        Self {
            cart_is_empty: cart.is_empty(),
            lines,
            item_count,
            subtotal,
            total: subtotal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use food_miniapp_core::Product;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new(ProductId::new(1), "Truffle Burger", Price::new(45_000), "burger", "a"),
            Product::new(ProductId::new(2), "Classic Cola", Price::new(12_000), "drink", "b"),
        ])
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1));
        cart.add(ProductId::new(1));
        cart.add(ProductId::new(2));
        cart
    }

    #[test]
    fn test_badge_hidden_when_empty() {
        assert!(!Badge::new(0).is_visible());
        assert_eq!(Badge::new(0).to_string(), "");
        assert_eq!(Badge::new(3).to_string(), "3");
    }

    #[test]
    fn test_catalog_view_renders_grid() {
        let view = CatalogView::build(&catalog(), &CategoryFilter::All, &cart(), Some("Aziz"));
        let text = view.render().unwrap();
        assert!(text.contains("Salom, Aziz!"));
        assert!(text.contains("[1] Truffle Burger - 45 000 so'm (savatda: 2)"));
        assert!(text.contains("[2] Classic Cola - 12 000 so'm (savatda: 1)"));
        assert!(text.contains("Savat: 3"));
    }

    #[test]
    fn test_catalog_view_filtered() {
        let view = CatalogView::build(
            &catalog(),
            &CategoryFilter::parse("drink"),
            &Cart::new(),
            None,
        );
        assert_eq!(view.products.len(), 1);
        let text = view.render().unwrap();
        assert!(text.contains("Classic Cola"));
        assert!(!text.contains("Truffle Burger"));
        assert!(!text.contains("Savat:"));
    }

    #[test]
    fn test_catalog_view_empty_state() {
        let view = CatalogView::build(&Catalog::empty(), &CategoryFilter::All, &Cart::new(), None);
        assert!(view.render().unwrap().contains("Hozircha mahsulotlar mavjud emas..."));
    }

    #[test]
    fn test_cart_view_totals() {
        let view = CartView::build(&cart(), &catalog());
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.total, Price::new(102_000));

        let text = view.render().unwrap();
        assert!(text.contains("Truffle Burger x2 @ 45 000 so'm = 90 000 so'm"));
        assert!(text.contains("Jami: 102 000 so'm"));
    }

    #[test]
    fn test_cart_view_skips_stale_entries() {
        let mut cart = cart();
        cart.add(ProductId::new(99));
        let view = CartView::build(&cart, &catalog());
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, Price::new(102_000));
        assert!(view.render().unwrap().contains("Mahsulotlar: 3"));
    }

    #[test]
    fn test_cart_view_empty_state_hides_summary() {
        let text = CartView::build(&Cart::new(), &catalog()).render().unwrap();
        assert!(text.contains("Savat bo'sh..."));
        assert!(!text.contains("Jami"));
    }
}
