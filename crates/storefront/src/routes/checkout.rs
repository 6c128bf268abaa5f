//! Checkout route handlers: the order submitter.
//!
//! Submission is a two-step remote write: the order row first, then its
//! line items. There is no compensating delete - if the items insert
//! fails, the order row stays behind without items and the user is asked
//! to retry, which re-sends both writes. The cart is only cleared once
//! both writes succeed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mercadito_core::Customer;

use crate::error::AppError;
use crate::filters;
use crate::models::cart::Cart;
use crate::routes::cart::{CartView, load_cart, save_cart};
use crate::state::AppState;

/// Fixed retry message shown when either remote write fails.
const SUBMIT_FAILED_MESSAGE: &str =
    "Hubo un error al procesar tu pedido. Por favor intenta de nuevo.";

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

/// Checkout page template: the form plus a read-only cart summary.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate;

/// Display the checkout view.
///
/// The summary is a fresh snapshot of the cart: line subtotals and the
/// grand total are recomputed every time the view opens.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        cart: CartView::from(&cart),
        error: None,
    }
    .into_response()
}

/// Submit the order.
///
/// Computes the acting total from the cart at this instant, then performs
/// the two writes. Success clears the persisted cart and shows the
/// confirmation view; any failure leaves the cart untouched and re-renders
/// the checkout view with the retry message.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let mut cart = load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/").into_response();
    }

    let customer = match Customer::parse(
        &form.customer_name,
        &form.customer_email,
        &form.customer_phone,
    ) {
        Ok(customer) => customer,
        Err(e) => {
            return CheckoutTemplate {
                cart: CartView::from(&cart),
                error: Some(e.to_string()),
            }
            .into_response();
        }
    };

    match process_order(&state, &customer, &cart).await {
        Ok(()) => {
            cart.clear();
            save_cart(&session, &cart).await;
            SuccessTemplate.into_response()
        }
        Err(e) => {
            tracing::error!("Error processing order: {e}");
            CheckoutTemplate {
                cart: CartView::from(&cart),
                error: Some(SUBMIT_FAILED_MESSAGE.to_string()),
            }
            .into_response()
        }
    }
}

/// The two sequential remote writes.
async fn process_order(state: &AppState, customer: &Customer, cart: &Cart) -> Result<(), AppError> {
    use crate::supabase::{NewOrder, NewOrderItem};

    let order = state
        .supabase()
        .create_order(&NewOrder::from_cart(customer, cart))
        .await?;

    let items = NewOrderItem::from_cart(order.id, cart);
    state.supabase().create_order_items(&items).await?;

    tracing::info!(order_id = %order.id, total = %cart.total(), "Order created");
    Ok(())
}
