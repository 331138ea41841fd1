//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`.
//!
//! Every error renders as the JSON envelope the storefront expects:
//!
//! ```json
//! {"success": false, "message": "Error creating draft order"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Message returned for every failed submission.
pub const DRAFT_ORDER_FAILED_MESSAGE: &str = "Error creating draft order";

/// Message returned when the request has no body.
pub const NO_DATA_MESSAGE: &str = "Error: No data received";

/// Message returned when the request body is not JSON.
pub const INVALID_JSON_MESSAGE: &str = "Error: Invalid JSON body";

/// Application-level error type for the relay.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body was empty.
    #[error("No data received")]
    NoData,

    /// Request body was not valid JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// Shopify rejected the draft order or could not be reached.
    #[error("Shopify error: {0}")]
    DraftOrder(#[from] ShopifyError),

    /// Shopify accepted the draft order but returned no invoice URL.
    #[error("Draft order response has no invoice URL")]
    MissingInvoiceUrl,
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: &'static str,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoData | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::DraftOrder(_) | Self::MissingInvoiceUrl => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Never includes Shopify details.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::NoData => NO_DATA_MESSAGE,
            Self::InvalidJson(_) => INVALID_JSON_MESSAGE,
            Self::DraftOrder(_) | Self::MissingInvoiceUrl => DRAFT_ORDER_FAILED_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Rejected request");
        }

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for request milestones.
///
/// Breadcrumbs appear in Sentry error reports to show what the request did
/// before it failed.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("draft_order", "Submitting draft order", Some(&[("line_items", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::NoData.to_string(), "No data received");
        assert_eq!(
            AppError::InvalidJson("EOF while parsing".to_string()).to_string(),
            "Invalid JSON body: EOF while parsing"
        );
    }

    #[tokio::test]
    async fn test_no_data_response() {
        let (status, body) = render(AppError::NoData).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "message": "Error: No data received"})
        );
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let (status, body) = render(AppError::InvalidJson("x".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_submission_failures_share_one_response() {
        let rejected = AppError::DraftOrder(ShopifyError::Status {
            status: 422,
            body: "price is invalid".to_string(),
        });
        let (status, body) = render(rejected).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"success": false, "message": "Error creating draft order"})
        );

        let (status, body) = render(AppError::MissingInvoiceUrl).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"success": false, "message": "Error creating draft order"})
        );
    }

    #[tokio::test]
    async fn test_vendor_details_are_not_leaked() {
        let err = AppError::DraftOrder(ShopifyError::Status {
            status: 401,
            body: "Invalid API key or access token".to_string(),
        });
        let (_, body) = render(err).await;
        assert!(!body.to_string().contains("access token"));
    }
}
