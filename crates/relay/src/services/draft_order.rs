//! Draft order assembly.
//!
//! Turns a storefront submission into a Shopify draft order:
//!
//! 1. Resolve each requested line item to its variant (unresolved items are dropped)
//! 2. Copy every contact form field into a note attribute
//! 3. Copy the shipping choice into a custom shipping line
//! 4. Copy name, phone and email into the billing address
//! 5. Submit the order once
//!
//! Nothing here is persisted and nothing is retried.

use std::num::NonZeroUsize;

use draft_relay_core::{Quantity, VariantRef};
use futures::{StreamExt, future, stream};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::shopify::{
    AdminClient, BillingAddress, DraftOrder, DraftOrderCreated, DraftOrderLineItem, NoteAttribute,
    ShippingLine, ShopifyError, VariantLookup, blank,
};

/// Payload keys as sent by the storefront form.
const LINE_ITEMS_KEY: &str = "line_items";
const FORM_DETAILS_KEY: &str = "Form_details";
const SHIPPING_DETAILS_KEY: &str = "Shipping_details";

// =============================================================================
// Payload
// =============================================================================

/// A parsed storefront submission.
///
/// Every section is optional. A missing section, or one of the wrong JSON
/// type, is treated as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftOrderPayload {
    pub line_items: Vec<Value>,
    pub form_details: Map<String, Value>,
    pub shipping_details: Map<String, Value>,
}

/// A line item that is worth looking up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRequest {
    pub variant: VariantRef,
    pub quantity: Quantity,
}

impl DraftOrderPayload {
    /// Read a payload out of a JSON document.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let object = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        };

        Self {
            line_items: value
                .get(LINE_ITEMS_KEY)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            form_details: object(FORM_DETAILS_KEY),
            shipping_details: object(SHIPPING_DETAILS_KEY),
        }
    }

    /// Line items that name a variant, in submission order.
    ///
    /// Falsy entries and entries without a usable `id` are skipped here, so
    /// they never cost a lookup.
    #[must_use]
    pub fn requested_line_items(&self) -> Vec<LineItemRequest> {
        self.line_items
            .iter()
            .filter(|entry| !is_falsy(entry))
            .filter_map(|entry| {
                let variant = entry.get("id").and_then(VariantRef::from_json)?;
                let quantity = entry
                    .get("quantity")
                    .map_or_else(Quantity::invalid, Quantity::from_json);
                if !quantity.is_valid() {
                    debug!(variant_id = %variant, "Quantity is not an integer, sending null");
                }
                Some(LineItemRequest { variant, quantity })
            })
            .collect()
    }

    /// One note attribute per contact form field, in submission order.
    #[must_use]
    pub fn note_attributes(&self) -> Vec<NoteAttribute> {
        self.form_details
            .iter()
            .map(|(name, value)| NoteAttribute {
                name: name.clone(),
                value: value.clone(),
            })
            .collect()
    }

    /// Custom shipping line with title and price copied verbatim.
    #[must_use]
    pub fn shipping_line(&self) -> ShippingLine {
        ShippingLine {
            custom: true,
            title: self.shipping_details.get("type").cloned(),
            price: self.shipping_details.get("price").cloned(),
        }
    }

    /// Billing identity taken from the contact form.
    #[must_use]
    pub fn billing_address(&self) -> BillingAddress {
        BillingAddress {
            email: self.form_value("email"),
            name: self.form_value("name"),
            phone: self.form_value("phone"),
        }
    }

    /// A contact form field as submitted; absent or falsy values become `""`.
    fn form_value(&self, key: &str) -> Value {
        self.form_details
            .get(key)
            .filter(|value| !is_falsy(value))
            .cloned()
            .unwrap_or_else(blank)
    }

    /// Assemble the draft order around already-resolved line items.
    #[must_use]
    pub fn to_draft_order(&self, line_items: Vec<DraftOrderLineItem>) -> DraftOrder {
        let billing_address = self.billing_address();

        DraftOrder {
            line_items,
            shipping_line: self.shipping_line(),
            note_attributes: self.note_attributes(),
            email: billing_address.email.clone(),
            billing_address,
        }
    }
}

/// JSON falsiness as understood by the storefront: `null`, `false`, `0`
/// and the empty string.
#[allow(clippy::float_cmp)] // Only exact zero (and -0) is falsy
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

// =============================================================================
// Service
// =============================================================================

/// Assembles and submits draft orders.
#[derive(Debug, Clone)]
pub struct DraftOrderService {
    admin: AdminClient,
    lookup_concurrency: NonZeroUsize,
}

impl DraftOrderService {
    /// Create a new service.
    ///
    /// `lookup_concurrency` bounds how many variant lookups run at once for a
    /// single submission. With 1, lookups run strictly one after another.
    #[must_use]
    pub const fn new(admin: AdminClient, lookup_concurrency: NonZeroUsize) -> Self {
        Self {
            admin,
            lookup_concurrency,
        }
    }

    /// Resolve line items and build the draft order, without submitting it.
    #[instrument(skip_all, fields(requested = payload.line_items.len()))]
    pub async fn assemble(&self, payload: &DraftOrderPayload) -> DraftOrder {
        let line_items = self.resolve_line_items(payload.requested_line_items()).await;
        debug!(resolved = line_items.len(), "Line items resolved");
        payload.to_draft_order(line_items)
    }

    /// Submit an assembled draft order.
    ///
    /// # Errors
    ///
    /// Returns the Shopify error when submission fails for any reason.
    pub async fn submit(&self, order: &DraftOrder) -> Result<DraftOrderCreated, ShopifyError> {
        self.admin.create_draft_order(order).await
    }

    /// Assemble and submit a draft order.
    ///
    /// # Errors
    ///
    /// Returns the Shopify error when submission fails. Line items that
    /// cannot be resolved are not errors; they are left out of the order.
    pub async fn create(
        &self,
        payload: &DraftOrderPayload,
    ) -> Result<DraftOrderCreated, ShopifyError> {
        let order = self.assemble(payload).await;
        self.submit(&order).await
    }

    /// Look up every requested item, keeping submission order.
    async fn resolve_line_items(&self, requested: Vec<LineItemRequest>) -> Vec<DraftOrderLineItem> {
        let admin = &self.admin;

        stream::iter(requested)
            .map(|item| async move {
                let lookup = admin.get_variant(&item.variant).await;
                (item, lookup)
            })
            .buffered(self.lookup_concurrency.get())
            .filter_map(|(item, lookup)| future::ready(resolve(item, lookup)))
            .collect()
            .await
    }
}

/// Pair a requested item with its lookup outcome.
fn resolve(item: LineItemRequest, lookup: VariantLookup) -> Option<DraftOrderLineItem> {
    match &lookup {
        VariantLookup::Found(_) => {}
        VariantLookup::Missing => {
            info!(variant_id = %item.variant, "Dropping line item: variant not found");
        }
        VariantLookup::Failed(e) => {
            warn!(variant_id = %item.variant, error = %e, "Dropping line item: variant lookup failed");
        }
    }

    lookup.into_variant().map(|variant| DraftOrderLineItem {
        variant_id: item.variant,
        product_id: variant.product_id,
        quantity: item.quantity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use draft_relay_core::{DraftOrderId, ProductId};
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::config::ShopifyAdminConfig;

    fn payload(value: &Value) -> DraftOrderPayload {
        DraftOrderPayload::from_json(value)
    }

    fn service(server: &MockServer, concurrency: usize) -> DraftOrderService {
        let config = ShopifyAdminConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            access_token: SecretString::from("shpat_test_token"),
            api_version: "2024-10".to_string(),
            timeout: None,
        };
        DraftOrderService::new(
            AdminClient::new(&config).unwrap(),
            NonZeroUsize::new(concurrency).unwrap(),
        )
    }

    async fn mount_variant(server: &MockServer, id: i64, product_id: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/admin/variants/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "variant": {"id": id, "product_id": product_id}
            })))
            .mount(server)
            .await;
    }

    // -------------------------------------------------------------------------
    // Payload parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_payload_degrades_to_defaults() {
        let p = payload(&json!({}));
        assert!(p.requested_line_items().is_empty());

        let order = p.to_draft_order(vec![]);
        assert!(order.line_items.is_empty());
        assert!(order.note_attributes.is_empty());
        assert_eq!(order.billing_address, BillingAddress::default());
        assert_eq!(order.email, "");
        assert_eq!(
            serde_json::to_value(&order.shipping_line).unwrap(),
            json!({"custom": true})
        );
    }

    #[test]
    fn test_wrong_section_types_are_ignored() {
        let p = payload(&json!({
            "line_items": {"id": 1},
            "Form_details": "name",
            "Shipping_details": [1, 2]
        }));
        assert_eq!(p, DraftOrderPayload::default());

        // Not an object at all
        assert_eq!(payload(&json!([1, 2, 3])), DraftOrderPayload::default());

        // Form details must be a mapping; arrays name no fields
        let p = payload(&json!({"Form_details": ["Ada", "ada@example.com"]}));
        assert!(p.note_attributes().is_empty());
    }

    #[test]
    fn test_requested_line_items_skip_empty_entries() {
        let p = payload(&json!({
            "line_items": [
                null,
                {"id": 111, "quantity": "2"},
                0,
                "",
                false,
                {"quantity": 3},
                {"id": "", "quantity": 1},
                {"id": "222", "quantity": 5}
            ]
        }));

        assert_eq!(
            p.requested_line_items(),
            vec![
                LineItemRequest {
                    variant: VariantRef::Numeric(111.into()),
                    quantity: Quantity::new(2),
                },
                LineItemRequest {
                    variant: VariantRef::Text("222".to_string()),
                    quantity: Quantity::new(5),
                },
            ]
        );
    }

    #[test]
    fn test_unparseable_quantity_passes_through_as_invalid() {
        let p = payload(&json!({
            "line_items": [{"id": 111, "quantity": "abc"}, {"id": 112}]
        }));
        let requested = p.requested_line_items();
        assert_eq!(requested.len(), 2);
        assert!(requested.iter().all(|r| !r.quantity.is_valid()));
    }

    #[test]
    fn test_note_attributes_keep_form_order() {
        let p = payload(&json!({
            "Form_details": {
                "phone": "555",
                "name": "A",
                "zip": "90210",
                "email": "a@x.com"
            }
        }));

        let names: Vec<_> = p.note_attributes().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["phone", "name", "zip", "email"]);
        assert_eq!(
            p.note_attributes().first().map(|a| a.value.clone()),
            Some(json!("555"))
        );
    }

    #[test]
    fn test_billing_copies_contact_fields() {
        let p = payload(&json!({
            "Form_details": {"name": "A", "email": "a@x.com", "phone": null}
        }));
        let order = p.to_draft_order(vec![]);

        assert_eq!(
            order.billing_address,
            BillingAddress {
                email: json!("a@x.com"),
                name: json!("A"),
                phone: json!(""),
            }
        );
        assert_eq!(order.email, "a@x.com");
    }

    #[test]
    fn test_billing_forwards_non_string_values_unchanged() {
        let p = payload(&json!({
            "Form_details": {"name": 0, "email": false, "phone": 5_551_234}
        }));
        let order = p.to_draft_order(vec![]);

        assert_eq!(order.billing_address.phone, json!(5_551_234));
        assert_eq!(order.billing_address.name, json!(""));
        assert_eq!(order.billing_address.email, json!(""));
        assert_eq!(order.email, json!(""));
    }

    #[test]
    fn test_shipping_line_is_verbatim() {
        let p = payload(&json!({
            "Shipping_details": {"type": "Standard", "price": "five dollars", "eta": "2d"}
        }));
        assert_eq!(
            serde_json::to_value(p.shipping_line()).unwrap(),
            json!({"custom": true, "title": "Standard", "price": "five dollars"})
        );
    }

    // -------------------------------------------------------------------------
    // Resolution against a mocked store
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_assemble_resolves_and_drops() {
        let server = MockServer::start().await;
        mount_variant(&server, 111, 999).await;
        Mock::given(method("GET"))
            .and(path("/admin/variants/404.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/variants/500.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let p = payload(&json!({
            "line_items": [
                {"id": 404, "quantity": 1},
                {"id": 111, "quantity": "2"},
                {"id": 500, "quantity": 1}
            ]
        }));
        let order = service(&server, 1).assemble(&p).await;

        assert_eq!(
            order.line_items,
            vec![DraftOrderLineItem {
                variant_id: VariantRef::Numeric(111.into()),
                product_id: ProductId::new(999),
                quantity: Quantity::new(2),
            }]
        );
    }

    #[tokio::test]
    async fn test_assemble_drops_variant_without_product() {
        let server = MockServer::start().await;
        mount_variant(&server, 111, 999).await;
        Mock::given(method("GET"))
            .and(path("/admin/variants/222.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"variant": {"id": 222}})),
            )
            .mount(&server)
            .await;

        let p = payload(&json!({
            "line_items": [{"id": 222, "quantity": 1}, {"id": 111, "quantity": 1}]
        }));
        let order = service(&server, 1).assemble(&p).await;

        let variants: Vec<_> = order.line_items.iter().map(|i| i.variant_id.clone()).collect();
        assert_eq!(variants, [VariantRef::Numeric(111.into())]);
    }

    #[tokio::test]
    async fn test_assemble_repeated_variant_is_looked_up_each_time() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/variants/111.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "variant": {"id": 111, "product_id": 999}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let p = payload(&json!({
            "line_items": [{"id": 111, "quantity": 1}, {"id": 111, "quantity": 3}]
        }));
        let order = service(&server, 1).assemble(&p).await;

        let quantities: Vec<_> = order.line_items.iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, [Quantity::new(1), Quantity::new(3)]);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_keep_input_order() {
        let server = MockServer::start().await;
        // Earlier items answer slower, so completion order is reversed
        for (id, delay_ms) in [(1_i64, 150_u64), (2, 75), (3, 0)] {
            Mock::given(method("GET"))
                .and(path(format!("/admin/variants/{id}.json")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"variant": {"id": id, "product_id": id * 10}}))
                        .set_delay(std::time::Duration::from_millis(delay_ms)),
                )
                .mount(&server)
                .await;
        }

        let p = payload(&json!({
            "line_items": [{"id": 1, "quantity": 1}, {"id": 2, "quantity": 1}, {"id": 3, "quantity": 1}]
        }));
        let order = service(&server, 3).assemble(&p).await;

        let products: Vec<_> = order.line_items.iter().map(|i| i.product_id.as_i64()).collect();
        assert_eq!(products, [10, 20, 30]);
    }

    #[tokio::test]
    async fn test_create_submits_once_and_returns_raw_body() {
        let server = MockServer::start().await;
        mount_variant(&server, 111, 999).await;
        Mock::given(method("POST"))
            .and(path("/admin/api/2024-10/draft_orders.json"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "draft_order": {"id": 5, "invoice_url": "https://x/y", "status": "open"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let p = payload(&json!({
            "line_items": [{"id": 111, "quantity": "2"}],
            "Form_details": {"name": "A", "email": "a@x.com"},
            "Shipping_details": {"type": "Standard", "price": "5.00"}
        }));
        let created = service(&server, 1).create(&p).await.unwrap();

        assert_eq!(created.invoice_url(), Some("https://x/y"));
        assert_eq!(created.id(), Some(DraftOrderId::new(5)));

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let posted = requests
            .iter()
            .find(|r| r.method.as_str() == "POST")
            .unwrap();
        let body: Value = serde_json::from_slice(&posted.body).unwrap();
        assert_eq!(
            body,
            json!({
                "draft_order": {
                    "line_items": [{"variant_id": 111, "product_id": 999, "quantity": 2}],
                    "shipping_line": {"custom": true, "title": "Standard", "price": "5.00"},
                    "note_attributes": [
                        {"name": "name", "value": "A"},
                        {"name": "email", "value": "a@x.com"}
                    ],
                    "billing_address": {"email": "a@x.com", "name": "A", "phone": ""},
                    "email": "a@x.com"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_create_propagates_submission_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"errors": "bad"})))
            .mount(&server)
            .await;

        let err = service(&server, 1)
            .create(&DraftOrderPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShopifyError::Status { status: 422, .. }));
    }
}
