//! Shopify Admin REST API client.
//!
//! # Security
//!
//! The relay holds an Admin API access token. It is sent only in the
//! `X-Shopify-Access-Token` header, marked sensitive, and never logged.
//!
//! # Endpoints
//!
//! - `GET  {store}/admin/variants/{id}.json` - variant lookup
//! - `POST {store}/admin/api/{version}/draft_orders.json` - draft order creation
//!
//! # Example
//!
//! ```rust,ignore
//! use draft_relay::shopify::{AdminClient, VariantLookup};
//!
//! let client = AdminClient::new(&config.shopify)?;
//!
//! match client.get_variant(&variant_ref).await {
//!     VariantLookup::Found(variant) => println!("product {}", variant.product_id),
//!     VariantLookup::Missing => println!("no such variant"),
//!     VariantLookup::Failed(e) => println!("lookup failed: {e}"),
//! }
//! ```

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maximum number of response body characters kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Truncate a response body for diagnostics.
fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
