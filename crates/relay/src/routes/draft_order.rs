//! Draft order route handler.
//!
//! The body is read as raw bytes rather than through `Json<T>` so that a
//! missing `Content-Type` is accepted and an empty body gets its own error.

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::DraftOrderPayload;
use crate::state::AppState;

/// Message returned when the draft order was created.
pub const SUCCESS_MESSAGE: &str = "Draft Order created successfully";

/// Response for a created draft order.
#[derive(Debug, Serialize)]
pub struct DraftOrderResponse {
    pub success: bool,
    pub message: &'static str,
    pub invoice_url: String,
}

/// Create a draft order from a storefront submission.
///
/// POST /create-draft-order
///
/// Every call creates a new draft order in Shopify. Line items whose
/// variant cannot be resolved are left out; the order is still created.
#[instrument(skip_all, fields(body_len = body.len()))]
pub async fn create_draft_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DraftOrderResponse>> {
    let payload = parse_payload(&body)?;

    let requested = payload.line_items.len().to_string();
    add_breadcrumb(
        "draft_order",
        "Submitting draft order",
        Some(&[("line_items", requested.as_str())]),
    );

    let created = state.draft_orders().create(&payload).await?;

    let Some(invoice_url) = created.invoice_url() else {
        return Err(AppError::MissingInvoiceUrl);
    };

    tracing::info!(
        draft_order_id = ?created.id(),
        "Draft order created"
    );

    Ok(Json(DraftOrderResponse {
        success: true,
        message: SUCCESS_MESSAGE,
        invoice_url: invoice_url.to_string(),
    }))
}

/// Parse the request body.
///
/// An empty body, or one that is only whitespace or `null`, counts as no
/// data. Only objects and arrays are accepted as documents; an array names
/// no sections and becomes an empty payload.
///
/// # Errors
///
/// Returns `NoData` for an empty body and `InvalidJson` for malformed JSON
/// or a bare primitive such as `5` or `"hello"`.
pub fn parse_payload(body: &[u8]) -> Result<DraftOrderPayload> {
    if body.trim_ascii().is_empty() {
        return Err(AppError::NoData);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidJson(e.to_string()))?;

    if value.is_null() {
        return Err(AppError::NoData);
    }

    if !(value.is_object() || value.is_array()) {
        return Err(AppError::InvalidJson(format!(
            "expected an object or array, got {value}"
        )));
    }

    Ok(DraftOrderPayload::from_json(&value))
}
