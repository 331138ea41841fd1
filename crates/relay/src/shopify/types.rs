//! Shopify Admin REST types used by the relay.
//!
//! Only the fields the relay reads or writes are typed. Everything else in a
//! Shopify response is kept as raw JSON so it can be returned unchanged.

use draft_relay_core::{DraftOrderId, ProductId, Quantity, VariantId, VariantRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ShopifyError;

// =============================================================================
// Variants
// =============================================================================

/// A product variant as returned by `GET /admin/variants/{id}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    /// Remaining fields (title, price, sku, ...), untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Envelope of the variant lookup response.
#[derive(Debug, Deserialize)]
pub(super) struct VariantEnvelope {
    #[serde(default)]
    pub variant: Option<Variant>,
}

/// Outcome of a variant lookup.
///
/// Lookups never fail from the caller's point of view. `Missing` means
/// Shopify answered and has no such variant; `Failed` means we could not get
/// a usable answer. Callers that only care whether a variant is available use
/// [`VariantLookup::into_variant`], which treats both the same way.
#[derive(Debug)]
pub enum VariantLookup {
    Found(Variant),
    Missing,
    Failed(ShopifyError),
}

impl VariantLookup {
    /// The variant, if one was found.
    #[must_use]
    pub fn into_variant(self) -> Option<Variant> {
        match self {
            Self::Found(variant) => Some(variant),
            Self::Missing | Self::Failed(_) => None,
        }
    }
}

// =============================================================================
// Draft orders
// =============================================================================

/// Request body for `POST /admin/api/{version}/draft_orders.json`.
#[derive(Debug, Serialize)]
pub(super) struct DraftOrderEnvelope<'a> {
    pub draft_order: &'a DraftOrder,
}

/// A draft order ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrder {
    pub line_items: Vec<DraftOrderLineItem>,
    pub shipping_line: ShippingLine,
    pub note_attributes: Vec<NoteAttribute>,
    pub billing_address: BillingAddress,
    pub email: Value,
}

/// A resolved line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrderLineItem {
    /// Variant reference exactly as the storefront sent it.
    pub variant_id: VariantRef,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// A custom shipping line.
///
/// Title and price are copied verbatim from the submission. Absent values
/// are left out of the request rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingLine {
    pub custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
}

/// A free-form order annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: Value,
}

/// Billing identity copied from the contact form.
///
/// Values are forwarded as submitted. A field left blank is the empty
/// string, never `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub email: Value,
    pub name: Value,
    pub phone: Value,
}

impl Default for BillingAddress {
    fn default() -> Self {
        Self {
            email: blank(),
            name: blank(),
            phone: blank(),
        }
    }
}

/// The value sent for a contact field that was left blank.
#[must_use]
pub fn blank() -> Value {
    Value::String(String::new())
}

/// Response of a successful draft order creation.
///
/// Holds the raw body. Use [`DraftOrderCreated::invoice_url`] to check
/// whether Shopify returned a payable invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOrderCreated {
    raw: Value,
}

impl DraftOrderCreated {
    #[must_use]
    pub const fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The invoice URL, when present and non-empty.
    #[must_use]
    pub fn invoice_url(&self) -> Option<&str> {
        self.raw
            .pointer("/draft_order/invoice_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    /// The draft order ID, when present.
    #[must_use]
    pub fn id(&self) -> Option<DraftOrderId> {
        self.raw
            .pointer("/draft_order/id")
            .and_then(Value::as_i64)
            .map(DraftOrderId::new)
    }
}
