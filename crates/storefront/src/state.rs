//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; owns the configuration, the Supabase
/// client and the catalog snapshot.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    supabase: SupabaseClient,
    catalog: RwLock<Catalog>,
}

impl AppState {
    /// Create a new application state with an empty catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the Supabase client cannot be built from the
    /// configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                catalog: RwLock::new(Catalog::new()),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Supabase client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get a reference to the catalog snapshot lock.
    #[must_use]
    pub fn catalog(&self) -> &RwLock<Catalog> {
        &self.inner.catalog
    }

    /// Refresh the catalog snapshot: categories first, then products.
    ///
    /// Fetch failures are logged inside [`Catalog::refresh`] and leave the
    /// affected list empty; the home view simply renders its placeholders.
    pub async fn refresh_catalog(&self) {
        let mut catalog = self.inner.catalog.write().await;
        catalog.refresh(&self.inner.supabase).await;
    }
}
