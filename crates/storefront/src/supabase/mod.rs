//! Supabase PostgREST client.
//!
//! # Architecture
//!
//! - Plain `reqwest` against the project's `/rest/v1/` endpoint
//! - Supabase is the source of truth - no local sync, direct API calls
//! - No retries and no pagination; each call is one-shot
//!
//! # Surface
//!
//! Reads: `categories` (sorted by name) and `products` (sorted by
//! `created_at` descending, with the joined category name/slug).
//! Writes: one `orders` row, then its `order_items` rows in bulk.

pub mod types;

pub use types::{Category, CreatedOrder, NewOrder, NewOrderItem, Product};

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::SupabaseConfig;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase answered with a non-success status.
    #[error("Supabase returned {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
    },

    /// Response body could not be parsed.
    #[error("Failed to parse Supabase response: {0}")]
    Parse(#[from] serde_json::Error),

    /// An insert with `return=representation` came back empty.
    #[error("Supabase returned no rows for {0}")]
    MissingRecord(&'static str),

    /// The configured project URL cannot address a table.
    #[error("Invalid Supabase URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the Supabase PostgREST API.
///
/// Cheaply cloneable; holds the shared `reqwest` client, the `/rest/v1/`
/// endpoint and the anon key.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the project URL cannot be extended with the
    /// REST path.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let rest_url = config.url.join("rest/v1/")?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                rest_url,
                anon_key: config.anon_key().to_string(),
            }),
        })
    }

    /// Auth headers sent on every request.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.inner.anon_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.inner.anon_key)) {
            headers.insert(reqwest::header::AUTHORIZATION, bearer);
        }
        headers
    }

    fn table_url(&self, table: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.rest_url.join(table)?)
    }

    /// Read the body as text first so failures carry a diagnostic snippet.
    async fn parse_body<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Supabase returned non-success status"
            );
            return Err(SupabaseError::Api {
                status,
                message: body.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse Supabase response"
                );
                Err(SupabaseError::Parse(e))
            }
        }
    }

    /// `GET` rows from a table.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SupabaseError> {
        let response = self
            .inner
            .client
            .get(self.table_url(table)?)
            .headers(self.headers())
            .query(query)
            .send()
            .await?;

        Self::parse_body(response).await
    }

    /// `POST` an insert payload to a table.
    async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
        prefer: &'static str,
    ) -> Result<reqwest::Response, SupabaseError> {
        let response = self
            .inner
            .client
            .post(self.table_url(table)?)
            .headers(self.headers())
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;

        Ok(response)
    }

    // =========================================================================
    // Catalog Reads
    // =========================================================================

    /// Fetch all categories, sorted by name ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, SupabaseError> {
        self.select("categories", &[("select", "*"), ("order", "name.asc")])
            .await
    }

    /// Fetch all products with their joined category name/slug, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, SupabaseError> {
        self.select(
            "products",
            &[
                ("select", "*,categories(name,slug)"),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    // =========================================================================
    // Order Writes
    // =========================================================================

    /// Insert an order row and return the created record (with its id).
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or no row is echoed back.
    #[instrument(skip(self, order), fields(customer = %order.customer_email))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<CreatedOrder, SupabaseError> {
        let response = self
            .insert("orders", order, "return=representation")
            .await?;

        let mut rows: Vec<CreatedOrder> = Self::parse_body(response).await?;

        if rows.is_empty() {
            return Err(SupabaseError::MissingRecord("orders"));
        }
        Ok(rows.swap_remove(0))
    }

    /// Bulk-insert the line items for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn create_order_items(&self, items: &[NewOrderItem]) -> Result<(), SupabaseError> {
        let response = self.insert("order_items", items, "return=minimal").await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Supabase rejected order items insert"
            );
            return Err(SupabaseError::Api {
                status,
                message: body.chars().take(200).collect(),
            });
        }

        Ok(())
    }
}
