//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session under a single key; every mutating
//! handler follows the same contract: load, mutate, persist, render.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mercadito_core::ProductId;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::cart::{Cart, CartItem};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub unit_price: String,
    pub line_price: String,
    pub image_url: String,
    pub quantity: u32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: "$0.00".to_string(),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Format a decimal amount as a display price, rounding midpoints away
/// from zero. Formatting alone would truncate.
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "${:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            unit_price: item.price.display(),
            line_price: format_amount(item.subtotal()),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: format_amount(cart.total()),
            item_count: cart.count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the persisted cart from the session.
///
/// A missing or malformed entry is treated as an empty cart; this never
/// fails the caller.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Discarding malformed persisted cart: {e}");
            None
        })
        .unwrap_or_default()
}

/// Persist the cart to the session.
///
/// Called after every mutation; a failed write is logged and the request
/// continues with the in-memory state.
pub async fn save_cart(session: &Session, cart: &Cart) {
    if let Err(e) = session.insert(session_keys::CART, cart).await {
        tracing::error!("Failed to persist cart to session: {e}");
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub delta: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Parse the product id posted from rendered markup.
fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<ProductId>()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {raw}")))
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Count badge plus the added-to-cart toast, swapped out-of-band (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Looks the product up in the catalog snapshot; an unknown id is a no-op
/// that returns the badge without a toast. A successful add returns the
/// badge plus the confirmation toast, with an HTMX trigger so other
/// fragments can refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    let mut cart = load_cart(&session).await;

    {
        let catalog = state.catalog().read().await;
        let Some(product) = catalog.product(product_id) else {
            // Not in the snapshot: nothing to add, nothing to report.
            return Ok(CartCountTemplate { count: cart.count() }.into_response());
        };
        cart.add_product(product);
    }

    save_cart(&session, &cart).await;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartAddedTemplate { count: cart.count() },
    )
        .into_response())
}

/// Apply a quantity delta to a cart line (HTMX).
///
/// A resulting quantity of zero or below removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    let mut cart = load_cart(&session).await;
    cart.update_quantity(product_id, form.delta);
    save_cart(&session, &cart).await;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    let mut cart = load_cart(&session).await;
    cart.remove(product_id);
    save_cart(&session, &cart).await;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartCountTemplate { count: cart.count() }
}
