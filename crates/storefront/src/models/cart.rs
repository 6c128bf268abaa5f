//! The client-held shopping cart.
//!
//! [`Cart`] is pure data: an ordered list of lines, one per product, in
//! insertion order. Persistence is a single session entry (see
//! [`crate::models::session_keys::CART`]) holding the JSON-serialized line
//! list `{id, name, price, image_url, quantity}`; the session helpers live
//! in the cart routes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mercadito_core::{Price, ProductId};

use crate::supabase::Product;

/// One cart line: a product snapshot plus a quantity.
///
/// Name, price and image are captured at the moment of adding and do not
/// track later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    pub quantity: u32,
}

impl CartItem {
    /// Line subtotal (price × quantity).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// Ordered sequence of cart lines; insertion order is display order.
///
/// Invariants: at most one line per product id, and every line has
/// `quantity >= 1` - a line driven to zero or below is removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from persisted lines.
    #[must_use]
    pub const fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// The lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a catalog product.
    ///
    /// Increments the existing line for this product if there is one,
    /// otherwise appends a new line with quantity 1, snapshotting the
    /// product's name, price and image.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity += 1;
            return;
        }

        self.items.push(CartItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity: 1,
        });
    }

    /// Remove the line for a product. No-op if absent.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.id != product_id);
    }

    /// Apply a quantity delta to a line. No-op if absent.
    ///
    /// A resulting quantity of zero or below removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) {
        let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) else {
            return;
        };

        let quantity = i64::from(item.quantity) + delta;
        if quantity <= 0 {
            self.remove(product_id);
        } else {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Sum of quantities, for the badge display.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(n: u128, name: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(Uuid::from_u128(n)),
            name: name.to_string(),
            description: String::new(),
            price: Price::new(price.parse::<Decimal>().unwrap()),
            image_url: format!("https://img.example/{n}.jpg"),
            featured: false,
            created_at: Utc::now(),
            category_id: None,
            category: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_adding_same_product_twice_increments_one_line() {
        let jamaica = product(1, "Agua de jamaica", "5");
        let mut cart = Cart::new();

        cart.add_product(&jamaica);
        cart.add_product(&jamaica);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_add_snapshots_product_fields() {
        let cafe = product(3, "Café de olla", "24.50");
        let mut cart = Cart::new();
        cart.add_product(&cafe);

        let line = &cart.items()[0];
        assert_eq!(line.name, "Café de olla");
        assert_eq!(line.price, cafe.price);
        assert_eq!(line.image_url, cafe.image_url);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let jamaica = product(1, "Agua de jamaica", "5");
        let mut cart = Cart::new();
        cart.add_product(&jamaica);
        cart.add_product(&jamaica);

        cart.update_quantity(jamaica.id, -2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_below_zero_removes_line() {
        let jamaica = product(1, "Agua de jamaica", "5");
        let mut cart = Cart::new();
        cart.add_product(&jamaica);

        cart.update_quantity(jamaica.id, -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_operations_on_absent_id_are_noops() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "Agua de jamaica", "5"));
        let before = cart.clone();

        let ghost = ProductId::new(Uuid::from_u128(42));
        cart.update_quantity(ghost, 1);
        cart.remove(ghost);

        assert_eq!(cart, before);
    }

    #[test]
    fn test_total_sums_price_times_quantity() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);

        let jamaica = product(1, "Agua de jamaica", "5");
        let tamal = product(2, "Tamal verde", "3");
        cart.add_product(&jamaica);
        cart.add_product(&jamaica);
        cart.add_product(&tamal);

        assert_eq!(cart.total(), dec("13"));
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_clear_drops_every_line() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "Agua de jamaica", "5"));
        cart.add_product(&product(2, "Tamal verde", "3"));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut cart = Cart::new();
        cart.add_product(&product(2, "Tamal verde", "3"));
        cart.add_product(&product(1, "Agua de jamaica", "5"));
        cart.add_product(&product(2, "Tamal verde", "3"));

        let names: Vec<&str> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Tamal verde", "Agua de jamaica"]);
    }

    #[test]
    fn test_persisted_shape_round_trips() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "Agua de jamaica", "5.25"));
        cart.add_product(&product(1, "Agua de jamaica", "5.25"));
        cart.add_product(&product(2, "Tamal verde", "3"));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_persisted_fields_match_storage_contract() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "Agua de jamaica", "5.25"));

        let value = serde_json::to_value(&cart).unwrap();
        let line = &value.as_array().unwrap()[0];
        for field in ["id", "name", "price", "image_url", "quantity"] {
            assert!(line.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_malformed_persisted_cart_is_an_error_not_a_panic() {
        // Callers map this to an empty cart.
        assert!(serde_json::from_str::<Cart>("{\"not\":\"a cart\"}").is_err());
        assert!(serde_json::from_str::<Cart>("[{\"id\":17}]").is_err());
    }
}
