//! In-memory catalog snapshot.
//!
//! The snapshot is the basis for all filtering and sorting. It is fetched
//! at startup (categories, then products) and replaced wholesale on
//! refresh; a failed fetch leaves the affected list empty and is only
//! logged - the affected view degrades, nothing retries.

use std::str::FromStr;

use mercadito_core::ProductId;
use tracing::warn;

use crate::supabase::{Category, Product, SupabaseClient};

/// Category selector for the navigation links.
///
/// `All` bypasses filtering; `Slug` keeps products whose joined category
/// slug matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    All,
    Slug(String),
}

impl CategorySelector {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Slug(slug) => product.category_slug() == Some(slug.as_str()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Slug(slug) => slug,
        }
    }
}

impl From<Option<String>> for CategorySelector {
    fn from(raw: Option<String>) -> Self {
        match raw {
            None => Self::All,
            Some(s) if s == "all" || s.is_empty() => Self::All,
            Some(slug) => Self::Slug(slug),
        }
    }
}

/// Sort order for the product set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Descending creation timestamp (the fetch order).
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    /// Unknown values fall back to the default order, like the sort
    /// selector they come from.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "name-asc" => Self::NameAsc,
            _ => Self::Newest,
        })
    }
}

/// Case-folded comparison key, standing in for a locale-aware collation.
fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// The in-memory copy of all products and categories.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// True until products have loaded. Categories alone cannot render
    /// the grid, so a snapshot with only categories still counts as empty
    /// and the home page retries the product fetch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Replace the category list wholesale.
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    /// Replace the product list wholesale.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    /// Look up a product by id in the current snapshot.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Re-order the product set in place.
    ///
    /// The new order sticks for every later render, until the next sort.
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::PriceAsc => self.products.sort_by_key(|p| p.price),
            SortKey::PriceDesc => {
                self.products.sort_by(|a, b| b.price.cmp(&a.price));
            }
            SortKey::NameAsc => {
                self.products
                    .sort_by(|a, b| name_key(&a.name).cmp(&name_key(&b.name)));
            }
            SortKey::Newest => {
                self.products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
        }
    }

    /// Products matching the active category, in snapshot order.
    #[must_use]
    pub fn filtered(&self, selector: &CategorySelector) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| selector.matches(p))
            .collect()
    }

    /// The featured-flagged subset of [`Self::filtered`].
    #[must_use]
    pub fn featured(&self, selector: &CategorySelector) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.featured && selector.matches(p))
            .collect()
    }

    /// Fetch categories, then products, replacing each list on success.
    ///
    /// Either fetch failing is logged and leaves that list as it was;
    /// the product fetch still runs after a category failure.
    pub async fn refresh(&mut self, client: &SupabaseClient) {
        match client.fetch_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => warn!("Error loading categories: {e}"),
        }

        match client.fetch_products().await {
            Ok(products) => self.products = products,
            Err(e) => warn!("Error loading products: {e}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mercadito_core::{CategoryId, Price};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::supabase::types::CategoryRef;

    fn product(n: u128, name: &str, price: &str, slug: Option<&str>, featured: bool) -> Product {
        Product {
            id: ProductId::new(Uuid::from_u128(n)),
            name: name.to_string(),
            description: String::new(),
            price: Price::new(price.parse::<Decimal>().unwrap()),
            image_url: String::new(),
            featured,
            created_at: Utc.timestamp_opt(1_700_000_000 + i64::try_from(n).unwrap(), 0).unwrap(),
            category_id: None,
            category: slug.map(|s| CategoryRef {
                name: s.to_string(),
                slug: s.to_string(),
            }),
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.set_products(vec![
            product(1, "Horchata", "10", Some("drinks"), true),
            product(2, "Tamal", "5", Some("food"), false),
            product(3, "Café", "20", Some("drinks"), false),
        ]);
        catalog
    }

    fn prices(catalog: &Catalog) -> Vec<String> {
        catalog
            .products()
            .iter()
            .map(|p| p.price.amount().to_string())
            .collect()
    }

    #[test]
    fn test_sort_by_price_both_directions() {
        let mut catalog = catalog();

        catalog.sort(SortKey::PriceAsc);
        assert_eq!(prices(&catalog), ["5", "10", "20"]);

        catalog.sort(SortKey::PriceDesc);
        assert_eq!(prices(&catalog), ["20", "10", "5"]);
    }

    #[test]
    fn test_sort_by_name_folds_case() {
        let mut catalog = Catalog::new();
        catalog.set_products(vec![
            product(1, "tamal", "1", None, false),
            product(2, "Café", "1", None, false),
            product(3, "Horchata", "1", None, false),
        ]);

        catalog.sort(SortKey::NameAsc);
        let names: Vec<&str> = catalog.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Café", "Horchata", "tamal"]);
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let mut catalog = catalog();
        catalog.sort(SortKey::PriceAsc);
        catalog.sort(SortKey::Newest);

        let names: Vec<&str> = catalog.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Café", "Tamal", "Horchata"]);
    }

    #[test]
    fn test_sort_order_sticks_until_next_sort() {
        let mut catalog = catalog();
        catalog.sort(SortKey::PriceAsc);

        // A later filter sees the sorted order.
        let filtered = catalog.filtered(&CategorySelector::All);
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Tamal", "Horchata", "Café"]);
    }

    #[test]
    fn test_filter_by_slug_keeps_only_matches() {
        let catalog = catalog();

        let drinks = catalog.filtered(&CategorySelector::Slug("drinks".to_string()));
        assert_eq!(drinks.len(), 2);
        assert!(drinks.iter().all(|p| p.category_slug() == Some("drinks")));

        let all = catalog.filtered(&CategorySelector::All);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_filter_all_preserves_order() {
        let catalog = catalog();
        let all = catalog.filtered(&CategorySelector::All);
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Horchata", "Tamal", "Café"]);
    }

    #[test]
    fn test_featured_is_subset_of_filter() {
        let catalog = catalog();

        let featured = catalog.featured(&CategorySelector::All);
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Horchata");

        let featured_food = catalog.featured(&CategorySelector::Slug("food".to_string()));
        assert!(featured_food.is_empty());
    }

    #[test]
    fn test_product_without_category_never_matches_a_slug() {
        let mut catalog = Catalog::new();
        catalog.set_products(vec![product(1, "Misterio", "1", None, false)]);

        assert!(catalog
            .filtered(&CategorySelector::Slug("drinks".to_string()))
            .is_empty());
        assert_eq!(catalog.filtered(&CategorySelector::All).len(), 1);
    }

    #[test]
    fn test_categories_alone_leave_the_snapshot_empty() {
        let mut catalog = Catalog::new();
        catalog.set_categories(vec![Category {
            id: CategoryId::new(Uuid::from_u128(1)),
            name: "Bebidas".to_string(),
            slug: "drinks".to_string(),
        }]);

        // A failed product fetch must keep triggering the reload retry.
        assert!(catalog.is_empty());

        catalog.set_products(vec![product(1, "Horchata", "10", Some("drinks"), true)]);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(CategorySelector::from(None), CategorySelector::All);
        assert_eq!(
            CategorySelector::from(Some("all".to_string())),
            CategorySelector::All
        );
        assert_eq!(
            CategorySelector::from(Some("drinks".to_string())),
            CategorySelector::Slug("drinks".to_string())
        );
    }

    #[test]
    fn test_sort_key_parsing_falls_back_to_newest() {
        assert_eq!("price-asc".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert_eq!("price-desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!("name-asc".parse::<SortKey>().unwrap(), SortKey::NameAsc);
        assert_eq!("whatever".parse::<SortKey>().unwrap(), SortKey::Newest);
    }

    #[test]
    fn test_product_lookup_by_id() {
        let catalog = catalog();
        assert!(catalog.product(ProductId::new(Uuid::from_u128(2))).is_some());
        assert!(catalog.product(ProductId::new(Uuid::from_u128(9))).is_none());
    }
}
