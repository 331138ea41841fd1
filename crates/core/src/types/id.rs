//! Newtype IDs for type-safe entity references.
//!
//! Shopify REST resources use 64-bit numeric IDs. Use the `define_id!` macro
//! to create type-safe wrappers that prevent accidentally mixing IDs from
//! different resource types.
//!
//! Inbound line items are looser: the storefront may send a variant ID as a
//! number or a string, so those are held as a [`VariantRef`] and echoed back
//! to Shopify exactly as received.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use draft_relay_core::define_id;
/// define_id!(CustomerId);
/// define_id!(LocationId);
///
/// let customer_id = CustomerId::new(1);
/// let location_id = LocationId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = location_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Shopify Admin REST resource IDs
define_id!(VariantId);
define_id!(ProductId);
define_id!(DraftOrderId);

/// A variant reference as submitted by the storefront.
///
/// Kept in its original JSON form so the `variant_id` sent to Shopify is the
/// value the client gave us, not a re-encoded one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantRef {
    /// Numeric ID, e.g. `111`.
    Numeric(Number),
    /// Textual ID, e.g. `"111"`.
    Text(String),
}

impl VariantRef {
    /// Extract a variant reference from an arbitrary JSON value.
    ///
    /// Returns `None` for anything that cannot name a variant: missing,
    /// `null`, booleans, containers and blank strings.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Numeric(n.clone())),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for VariantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_define_id_roundtrip() {
        let id = ProductId::new(999);
        assert_eq!(id.as_i64(), 999);
        assert_eq!(i64::from(id), 999);
        assert_eq!(id.to_string(), "999");
        assert_eq!(serde_json::to_value(id).unwrap(), json!(999));
    }

    #[test]
    fn test_variant_ref_from_number() {
        let r = VariantRef::from_json(&json!(111)).unwrap();
        assert_eq!(r.to_string(), "111");
        assert_eq!(serde_json::to_value(&r).unwrap(), json!(111));
    }

    #[test]
    fn test_variant_ref_from_string_keeps_string_form() {
        let r = VariantRef::from_json(&json!("111")).unwrap();
        assert_eq!(r.to_string(), "111");
        assert_eq!(serde_json::to_value(&r).unwrap(), json!("111"));
    }

    #[test]
    fn test_variant_ref_rejects_non_ids() {
        assert!(VariantRef::from_json(&json!(null)).is_none());
        assert!(VariantRef::from_json(&json!("")).is_none());
        assert!(VariantRef::from_json(&json!("   ")).is_none());
        assert!(VariantRef::from_json(&json!(true)).is_none());
        assert!(VariantRef::from_json(&json!({"id": 1})).is_none());
        assert!(VariantRef::from_json(&json!([1])).is_none());
    }
}
