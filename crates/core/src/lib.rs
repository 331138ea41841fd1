//! Draft Relay Core - Shared types library.
//!
//! This crate provides the domain types used by `draft-relay`, the HTTP
//! service that turns cart submissions into Shopify draft orders.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify IDs, inbound variant references
//!   and line item quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
