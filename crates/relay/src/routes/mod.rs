//! HTTP route handlers for the relay.
//!
//! # Route Structure
//!
//! ```text
//! GET     /health               - Liveness check
//! POST    /create-draft-order   - Turn a storefront submission into a draft order
//! OPTIONS *                     - CORS preflight (answered by middleware)
//! ```

pub mod draft_order;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Create the draft order routes router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/create-draft-order", post(draft_order::create_draft_order))
}
