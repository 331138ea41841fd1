//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::services::DraftOrderService;
use crate::shopify::{AdminClient, ShopifyError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds configuration and the clients built
/// from it; there is no per-request or persisted state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    draft_orders: DraftOrderService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify Admin client cannot be built.
    pub fn new(config: RelayConfig) -> Result<Self, ShopifyError> {
        let admin = AdminClient::new(&config.shopify)?;
        let draft_orders = DraftOrderService::new(admin, config.variant_lookup_concurrency);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                draft_orders,
            }),
        })
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Get a reference to the draft order service.
    #[must_use]
    pub fn draft_orders(&self) -> &DraftOrderService {
        &self.inner.draft_orders
    }
}
