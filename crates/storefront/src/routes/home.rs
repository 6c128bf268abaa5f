//! Home page route handler.
//!
//! The home page is the whole storefront surface: category navigation,
//! the featured strip, the product grid and the sort selector.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{CategorySelector, SortKey};
use crate::filters;
use crate::state::AppState;
use crate::supabase::{Category, Product};

/// Category display data for the navigation links.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// Product card display data.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_name: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            category_name: product
                .category
                .as_ref()
                .map_or_else(|| "Sin categoría".to_string(), |c| c.name.clone()),
            price: product.price.display(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Home page query parameters.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<CategoryView>,
    pub featured: Vec<ProductCardView>,
    pub products: Vec<ProductCardView>,
    pub active_category: String,
    pub sort: &'static str,
}

/// Display the storefront.
///
/// `?sort=` re-orders the snapshot in place before rendering, so the new
/// order sticks for later requests; `?category=` only scopes this render.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    // An empty snapshot means the startup fetch failed or never ran;
    // reloading the page is the user's retry.
    if state.catalog().read().await.is_empty() {
        state.refresh_catalog().await;
    }

    let sort = query
        .sort
        .as_deref()
        .map(|s| s.parse::<SortKey>().unwrap_or_default());
    if let Some(key) = sort {
        state.catalog().write().await.sort(key);
    }

    let selector = CategorySelector::from(query.category);

    let catalog = state.catalog().read().await;
    HomeTemplate {
        categories: catalog.categories().iter().map(CategoryView::from).collect(),
        featured: catalog
            .featured(&selector)
            .into_iter()
            .map(ProductCardView::from)
            .collect(),
        products: catalog
            .filtered(&selector)
            .into_iter()
            .map(ProductCardView::from)
            .collect(),
        active_category: selector.as_str().to_string(),
        sort: sort.unwrap_or_default().as_str(),
    }
}
