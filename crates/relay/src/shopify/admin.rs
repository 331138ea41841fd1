//! Shopify Admin REST client implementation.
//!
//! One outbound call per method, no retries and no caching. Variants are
//! fetched fresh every time, even when the same ID is requested twice.

use std::sync::Arc;

use draft_relay_core::VariantRef;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::types::{DraftOrder, DraftOrderCreated, DraftOrderEnvelope, Variant, VariantEnvelope};
use super::{ShopifyError, VariantLookup, body_excerpt};
use crate::config::ShopifyAdminConfig;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

// =============================================================================
// AdminClient
// =============================================================================

/// Client for the Shopify Admin REST API.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_version: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_version", &self.inner.api_version)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|e| ShopifyError::Config(format!("Invalid access token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert(HeaderName::from_static(ACCESS_TOKEN_HEADER), token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client: builder.build()?,
                base_url: config.base_url.clone(),
                api_version: config.api_version.clone(),
            }),
        })
    }

    /// Build an endpoint URL below the store base URL.
    fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.inner.base_url.clone();
        // Base URL is validated as http(s) at config load, so it always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// URL of the variant lookup endpoint.
    #[must_use]
    pub fn variant_url(&self, variant_id: &VariantRef) -> Url {
        self.endpoint(["admin", "variants", format!("{variant_id}.json").as_str()])
    }

    /// URL of the draft order creation endpoint.
    #[must_use]
    pub fn draft_orders_url(&self) -> Url {
        self.endpoint([
            "admin",
            "api",
            self.inner.api_version.as_str(),
            "draft_orders.json",
        ])
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Look up a variant.
    ///
    /// Never errors: every failure is reported as [`VariantLookup::Failed`].
    #[instrument(skip_all, fields(variant_id = %variant_id))]
    pub async fn get_variant(&self, variant_id: &VariantRef) -> VariantLookup {
        match self.fetch_variant(variant_id).await {
            Ok(Some(variant)) => {
                debug!(product_id = %variant.product_id, "Variant found");
                VariantLookup::Found(variant)
            }
            Ok(None) => {
                info!("Variant not found");
                VariantLookup::Missing
            }
            Err(e) => {
                warn!(error = %e, "Variant lookup failed");
                VariantLookup::Failed(e)
            }
        }
    }

    async fn fetch_variant(&self, variant_id: &VariantRef) -> Result<Option<Variant>, ShopifyError> {
        let response = self
            .inner
            .client
            .get(self.variant_url(variant_id))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: body_excerpt(&body),
            });
        }

        let envelope: VariantEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.variant)
    }

    // =========================================================================
    // Draft orders
    // =========================================================================

    /// Create a draft order.
    ///
    /// The order is posted exactly once. The raw response body is returned
    /// without checking for an invoice URL.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or a body
    /// that is not JSON.
    #[instrument(skip(self, order), fields(line_items = order.line_items.len()))]
    pub async fn create_draft_order(
        &self,
        order: &DraftOrder,
    ) -> Result<DraftOrderCreated, ShopifyError> {
        let response = self
            .inner
            .client
            .post(self.draft_orders_url())
            .json(&DraftOrderEnvelope { draft_order: order })
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Draft order request failed"))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %body_excerpt(&body),
                "Shopify rejected draft order"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: body_excerpt(&body),
            });
        }

        let raw: serde_json::Value = serde_json::from_str(&body).inspect_err(|e| {
            error!(
                error = %e,
                body = %body_excerpt(&body),
                "Failed to parse draft order response"
            );
        })?;

        Ok(DraftOrderCreated::new(raw))
    }
}
