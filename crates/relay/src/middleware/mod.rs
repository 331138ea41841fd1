//! HTTP middleware stack for the relay.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (permissive headers, preflight short-circuit)

pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::request_id_middleware;
