//! Business logic services.
//!
//! - [`draft_order`] - Draft order assembly and submission

pub mod draft_order;

pub use draft_order::{DraftOrderPayload, DraftOrderService, LineItemRequest};
