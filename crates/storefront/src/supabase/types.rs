//! Records exchanged with the Supabase tables.
//!
//! Reads: `categories` and `products` (with the joined category name/slug).
//! Writes: `orders` and `order_items`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercadito_core::{CategoryId, Customer, Email, OrderId, OrderStatus, Price, ProductId};

use crate::models::cart::Cart;

/// A product category.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Category fields joined onto a product row.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub name: String,
    pub slug: String,
}

/// A product row with its joined category.
///
/// Immutable once fetched; the whole set is replaced wholesale on refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// PostgREST embeds the joined table under its name.
    #[serde(rename = "categories", default)]
    pub category: Option<CategoryRef>,
}

impl Product {
    /// Joined category slug, if the product has one.
    #[must_use]
    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.slug.as_str())
    }
}

/// Insert payload for the `orders` table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub total_amount: Price,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Build the order row for a customer, totalling the cart at this instant.
    #[must_use]
    pub fn from_cart(customer: &Customer, cart: &Cart) -> Self {
        Self {
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            customer_phone: customer.phone.clone(),
            total_amount: Price::new(cart.total()),
            status: OrderStatus::Pending,
        }
    }
}

/// The created order row echoed back by the insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Insert payload for the `order_items` table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

impl NewOrderItem {
    /// One line item per cart entry, referencing the freshly created order.
    #[must_use]
    pub fn from_cart(order_id: OrderId, cart: &Cart) -> Vec<Self> {
        cart.items()
            .iter()
            .map(|item| Self {
                order_id,
                product_id: item.id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::cart::CartItem;

    fn price(s: &str) -> Price {
        Price::new(s.parse::<Decimal>().unwrap())
    }

    fn two_line_cart() -> Cart {
        Cart::from_items(vec![
            CartItem {
                id: ProductId::new(Uuid::from_u128(1)),
                name: "Agua de jamaica".to_string(),
                price: price("5"),
                image_url: String::new(),
                quantity: 2,
            },
            CartItem {
                id: ProductId::new(Uuid::from_u128(2)),
                name: "Tamal verde".to_string(),
                price: price("3"),
                image_url: String::new(),
                quantity: 1,
            },
        ])
    }

    #[test]
    fn test_order_totals_cart_at_submission() {
        let customer = Customer::parse("Ana", "ana@tienda.mx", "555-0134").unwrap();
        let order = NewOrder::from_cart(&customer, &two_line_cart());

        assert_eq!(order.total_amount, price("13"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_name, "Ana");
    }

    #[test]
    fn test_one_order_item_per_cart_entry() {
        let order_id = OrderId::new(Uuid::from_u128(99));
        let items = NewOrderItem::from_cart(order_id, &two_line_cart());

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.order_id == order_id));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price, price("5"));
        assert_eq!(items[1].quantity, 1);
    }

    #[test]
    fn test_product_parses_numeric_or_text_price_and_join() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Café de olla",
            "description": "Con piloncillo",
            "price": "24.50",
            "image_url": "https://img.example/cafe.jpg",
            "featured": true,
            "created_at": "2024-06-01T12:00:00+00:00",
            "category_id": "00000000-0000-0000-0000-000000000002",
            "categories": { "name": "Bebidas", "slug": "drinks" }
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, price("24.50"));
        assert!(product.featured);
        assert_eq!(product.category_slug(), Some("drinks"));
    }

    #[test]
    fn test_product_tolerates_missing_join() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Café de olla",
            "price": 24.5,
            "created_at": "2024-06-01T12:00:00Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category_slug(), None);
        assert!(!product.featured);
        assert_eq!(product.price, price("24.5"));
    }
}
